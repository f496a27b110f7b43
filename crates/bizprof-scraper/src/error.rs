use thiserror::Error;

/// Why a single page could not be fetched. Never fatal to a crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("fetch of {url} exceeded the crawl deadline")]
    Deadline { url: String },
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("could not extract enough content from {url}")]
    InsufficientContent { url: String },
}
