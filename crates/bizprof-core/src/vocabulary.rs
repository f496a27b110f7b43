//! Allowed vocabularies and banned phrases for collaborator output.
//!
//! The tables live in a YAML document so they can be revised without a code
//! change. The default document is embedded at build time.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::ConfigError;

const EMBEDDED_VOCABULARY: &str = include_str!("../../../config/vocabulary.yaml");

#[derive(Debug, Clone, Deserialize)]
pub struct ClientBaseConfig {
    pub default: String,
    pub allowed: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SealMessages {
    pub found: String,
    pub not_found: String,
}

/// On-disk shape of the vocabulary document.
#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyFile {
    pub client_base: ClientBaseConfig,
    pub owner_demographics: Vec<String>,
    pub payment_methods: Vec<String>,
    pub banned_phrases: Vec<String>,
    pub description_max_chars: usize,
    pub fallback_paths: Vec<String>,
    pub seal: SealMessages,
}

/// Validated, immutable vocabulary tables with the banned-phrase matcher
/// compiled once.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    file: VocabularyFile,
    banned: Option<Regex>,
}

impl Vocabulary {
    /// Parses the vocabulary embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the embedded document is invalid.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml(EMBEDDED_VOCABULARY)
    }

    /// Loads the vocabulary from `path`, or the embedded default when `None`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Self::embedded();
        };
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::VocabularyIo {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a vocabulary document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on malformed YAML or failed validation.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: VocabularyFile =
            serde_yaml::from_str(content).map_err(ConfigError::VocabularyParse)?;
        validate(&file)?;
        let banned = compile_banned(&file.banned_phrases)?;
        Ok(Self { file, banned })
    }

    #[must_use]
    pub fn fallback_paths(&self) -> &[String] {
        &self.file.fallback_paths
    }

    #[must_use]
    pub fn description_max_chars(&self) -> usize {
        self.file.description_max_chars
    }

    #[must_use]
    pub fn payment_methods(&self) -> &[String] {
        &self.file.payment_methods
    }

    #[must_use]
    pub fn owner_demographics(&self) -> &[String] {
        &self.file.owner_demographics
    }

    #[must_use]
    pub fn client_base_allowed(&self) -> &[String] {
        &self.file.client_base.allowed
    }

    #[must_use]
    pub fn banned_phrases(&self) -> &[String] {
        &self.file.banned_phrases
    }

    /// Seal status line for the record.
    #[must_use]
    pub fn seal_status(&self, found: bool) -> &str {
        if found {
            &self.file.seal.found
        } else {
            &self.file.seal.not_found
        }
    }

    /// Lower-cases `raw` and returns it if allowed, otherwise the configured default.
    #[must_use]
    pub fn client_base(&self, raw: &str) -> String {
        let lowered = raw.trim().to_lowercase();
        if self.file.client_base.allowed.iter().any(|a| a == &lowered) {
            lowered
        } else {
            self.file.client_base.default.clone()
        }
    }

    /// Canonical spelling of an approved owner demographic, if `raw` names one.
    #[must_use]
    pub fn owner_demographic(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        self.file
            .owner_demographics
            .iter()
            .find(|d| d.eq_ignore_ascii_case(trimmed))
            .cloned()
    }

    /// Filters a comma-separated payment list down to approved entries.
    ///
    /// Output uses the approved spelling, in first-mention order, deduplicated.
    #[must_use]
    pub fn payment_methods_from(&self, raw: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        raw.split(',')
            .map(str::trim)
            .filter_map(|item| {
                self.file
                    .payment_methods
                    .iter()
                    .find(|m| m.eq_ignore_ascii_case(item))
            })
            .filter(|m| seen.insert(m.as_str()))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn contains_banned(&self, text: &str) -> bool {
        self.banned.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Removes every banned phrase (whole words, any case) and re-collapses
    /// whitespace.
    #[must_use]
    pub fn strip_banned(&self, text: &str) -> String {
        let Some(re) = &self.banned else {
            return text.to_string();
        };
        let stripped = re.replace_all(text, "");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed
            .replace(" ,", ",")
            .replace(" .", ".")
            .trim()
            .to_string()
    }
}

fn validate(file: &VocabularyFile) -> Result<(), ConfigError> {
    if file.client_base.allowed.is_empty() {
        return Err(ConfigError::Validation(
            "client_base.allowed must be non-empty".to_string(),
        ));
    }
    let default = file.client_base.default.to_lowercase();
    if !file.client_base.allowed.iter().any(|a| a.to_lowercase() == default) {
        return Err(ConfigError::Validation(format!(
            "client_base.default '{}' is not in client_base.allowed",
            file.client_base.default
        )));
    }
    if file
        .client_base
        .allowed
        .iter()
        .any(|a| a.to_lowercase() != *a)
    {
        return Err(ConfigError::Validation(
            "client_base.allowed entries must be lower-case".to_string(),
        ));
    }
    if file.payment_methods.is_empty() {
        return Err(ConfigError::Validation(
            "payment_methods must be non-empty".to_string(),
        ));
    }
    if file.description_max_chars == 0 {
        return Err(ConfigError::Validation(
            "description_max_chars must be positive".to_string(),
        ));
    }
    if file
        .fallback_paths
        .iter()
        .any(|p| p.trim().trim_matches('/').is_empty())
    {
        return Err(ConfigError::Validation(
            "fallback_paths entries must be non-empty".to_string(),
        ));
    }
    Ok(())
}

fn compile_banned(phrases: &[String]) -> Result<Option<Regex>, ConfigError> {
    let mut cleaned: Vec<&str> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    // Longest first so multi-word phrases win over their prefixes.
    cleaned.sort_by_key(|p| std::cmp::Reverse(p.len()));
    let alternation = cleaned
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    let re = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
        .map_err(|e| ConfigError::Validation(format!("banned_phrases: {e}")))?;
    Ok(Some(re))
}
