pub mod app_config;
pub mod config;
pub mod record;
pub mod sanitize;
pub mod target;
pub mod vocabulary;

pub use app_config::{AppConfig, Environment, FallbackPolicy};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_USER_AGENT};
pub use record::{BusinessProfileRecord, SummaryFields, ABSENCE_MARKER};
pub use target::{CrawlTarget, TargetError};
pub use vocabulary::Vocabulary;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vocabulary file {path}: {source}")]
    VocabularyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vocabulary file: {0}")]
    VocabularyParse(#[source] serde_yaml::Error),

    #[error("vocabulary validation failed: {0}")]
    Validation(String),
}
