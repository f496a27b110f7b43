//! Document Fetcher: one GET per page with a fixed identity header set.

use std::time::Duration;

use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

use crate::error::{FetchError, ScraperError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const MAX_REDIRECTS: usize = 5;

/// Shared HTTP client for page retrieval.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

/// Follows redirects only while they stay on the requested site. A redirect
/// that leaves it is returned as-is and surfaces as a non-2xx status.
fn same_site_redirects() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() > MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        let leaves_site = attempt
            .previous()
            .first()
            .is_some_and(|origin| !same_site(origin, attempt.url()));
        if leaves_site {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// Same host ignoring a leading `www.`, on the same explicit port. Default
/// ports read as `None`, so an http to https upgrade stays on site.
fn same_site(from: &Url, to: &Url) -> bool {
    let bare = |u: &Url| {
        u.host_str()
            .map(|h| h.strip_prefix("www.").unwrap_or(h).to_ascii_lowercase())
    };
    bare(from) == bare(to) && from.port() == to.port()
}

impl PageFetcher {
    /// Builds a fetcher whose requests time out after `timeout_secs`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Client`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .redirect(same_site_redirects())
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the body of `url`. Any non-2xx status is an error.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] on transport failure or
    /// [`FetchError::Status`] on a non-success status.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, ACCEPT_HTML)
            .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn www_and_https_upgrade_stay_on_site() {
        assert!(same_site(&url("http://acme.com/"), &url("https://www.acme.com/")));
        assert!(same_site(&url("https://www.acme.com/a"), &url("https://acme.com/b")));
    }

    #[test]
    fn other_hosts_and_ports_leave_the_site() {
        assert!(!same_site(&url("https://acme.com/"), &url("https://partner.com/")));
        assert!(!same_site(&url("https://acme.com/"), &url("https://shop.acme.com/")));
        assert!(!same_site(&url("http://127.0.0.1:4000/"), &url("http://127.0.0.1:4001/")));
    }
}
