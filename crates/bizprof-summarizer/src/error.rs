use bizprof_scraper::ScraperError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("summarizer reply could not be decoded: {0}")]
    MalformedResponse(String),
}

/// Terminal failure of one profile run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scraper(#[from] ScraperError),

    #[error(transparent)]
    Summarizer(#[from] SummarizerError),
}
