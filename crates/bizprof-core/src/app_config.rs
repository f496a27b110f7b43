use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// When the walker probes the conventional fallback sub-paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Only when the traversal produced less text than the thin-content threshold.
    WhenThin,
    Always,
    Never,
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackPolicy::WhenThin => write!(f, "when-thin"),
            FallbackPolicy::Always => write!(f, "always"),
            FallbackPolicy::Never => write!(f, "never"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub vocabulary_path: Option<PathBuf>,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub crawl_deadline_secs: u64,
    pub crawl_max_pages: usize,
    pub crawl_max_depth: usize,
    pub crawl_concurrency: usize,
    pub min_corpus_chars: usize,
    pub fallback_policy: FallbackPolicy,
    pub lead_form_probes: usize,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("vocabulary_path", &self.vocabulary_path)
            .field("user_agent", &self.user_agent)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("crawl_deadline_secs", &self.crawl_deadline_secs)
            .field("crawl_max_pages", &self.crawl_max_pages)
            .field("crawl_max_depth", &self.crawl_max_depth)
            .field("crawl_concurrency", &self.crawl_concurrency)
            .field("min_corpus_chars", &self.min_corpus_chars)
            .field("fallback_policy", &self.fallback_policy)
            .field("lead_form_probes", &self.lead_form_probes)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .finish()
    }
}
