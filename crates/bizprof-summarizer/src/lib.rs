//! Summarization collaborator for business profiles.
//!
//! Sends the crawled corpus to an OpenAI-compatible chat-completions endpoint,
//! decodes the judgment fields it returns, and runs the full profile pipeline
//! (crawl, extract, summarize, merge).

pub mod client;
pub mod error;
pub mod pipeline;
pub mod prompt;

pub use client::Summarizer;
pub use error::{PipelineError, SummarizerError};
pub use pipeline::ProfilePipeline;
