use crate::app_config::{AppConfig, Environment, FallbackPolicy};
use crate::ConfigError;

/// Identity presented to crawled sites unless `BIZPROF_USER_AGENT` overrides it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) BizProfileBot/1.0 Chrome/123 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("BIZPROF_ENV", "development"))?;
    let bind_addr = parse_addr("BIZPROF_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BIZPROF_LOG_LEVEL", "info");
    let vocabulary_path = optional("BIZPROF_VOCABULARY_PATH").map(PathBuf::from);
    let user_agent = or_default("BIZPROF_USER_AGENT", DEFAULT_USER_AGENT);

    let fetch_timeout_secs = parse_u64("BIZPROF_FETCH_TIMEOUT_SECS", "15")?;
    let crawl_deadline_secs = parse_u64("BIZPROF_CRAWL_DEADLINE_SECS", "60")?;
    let crawl_max_pages = parse_usize("BIZPROF_CRAWL_MAX_PAGES", "30")?;
    let crawl_max_depth = parse_usize("BIZPROF_CRAWL_MAX_DEPTH", "2")?;
    let crawl_concurrency = parse_usize("BIZPROF_CRAWL_CONCURRENCY", "4")?;
    let min_corpus_chars = parse_usize("BIZPROF_MIN_CORPUS_CHARS", "40")?;
    let fallback_policy = parse_fallback_policy(&or_default("BIZPROF_FALLBACK_POLICY", "when-thin"))?;
    let lead_form_probes = parse_usize("BIZPROF_LEAD_FORM_PROBES", "3")?;

    if crawl_max_pages == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZPROF_CRAWL_MAX_PAGES".to_string(),
            reason: "page budget must be at least 1".to_string(),
        });
    }
    if crawl_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZPROF_CRAWL_CONCURRENCY".to_string(),
            reason: "concurrency must be at least 1".to_string(),
        });
    }

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_model = or_default("OPENAI_MODEL", "gpt-4.1");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1")
        .trim_end_matches('/')
        .to_string();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        vocabulary_path,
        user_agent,
        fetch_timeout_secs,
        crawl_deadline_secs,
        crawl_max_pages,
        crawl_max_depth,
        crawl_concurrency,
        min_corpus_chars,
        fallback_policy,
        lead_form_probes,
        openai_api_key,
        openai_model,
        openai_base_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIZPROF_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_fallback_policy(s: &str) -> Result<FallbackPolicy, ConfigError> {
    match s {
        "when-thin" => Ok(FallbackPolicy::WhenThin),
        "always" => Ok(FallbackPolicy::Always),
        "never" => Ok(FallbackPolicy::Never),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIZPROF_FALLBACK_POLICY".to_string(),
            reason: format!("expected when-thin, always or never; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
