//! Validation of the single root URL a profile run starts from.

use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("Please enter a website URL.")]
    Empty,
    #[error("Enter a single URL (no spaces or commas).")]
    MultipleValues,
    #[error("Please enter a valid URL.")]
    Malformed,
    #[error("URL must start with http:// or https://")]
    UnsupportedScheme,
}

/// A validated http(s) root URL. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    url: Url,
}

impl CrawlTarget {
    /// Validates user input as exactly one absolute http or https URL.
    ///
    /// # Errors
    ///
    /// Returns a [`TargetError`] whose message is suitable for the caller.
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }
        if trimmed.contains(|c: char| c.is_whitespace() || c == ',' || c == ';') {
            return Err(TargetError::MultipleValues);
        }
        let url = Url::parse(trimmed).map_err(|_| TargetError::Malformed)?;
        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(TargetError::UnsupportedScheme),
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(TargetError::Malformed),
        }
        Ok(Self { url })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl std::fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.url.as_str())
    }
}
