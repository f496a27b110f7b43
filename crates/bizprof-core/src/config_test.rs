use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BIZPROF_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults are valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.vocabulary_path.is_none());
    assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(cfg.fetch_timeout_secs, 15);
    assert_eq!(cfg.crawl_deadline_secs, 60);
    assert_eq!(cfg.crawl_max_pages, 30);
    assert_eq!(cfg.crawl_max_depth, 2);
    assert_eq!(cfg.crawl_concurrency, 4);
    assert_eq!(cfg.min_corpus_chars, 40);
    assert_eq!(cfg.fallback_policy, FallbackPolicy::WhenThin);
    assert_eq!(cfg.lead_form_probes, 3);
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.openai_model, "gpt-4.1");
    assert_eq!(cfg.openai_base_url, "https://api.openai.com/v1");
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("BIZPROF_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROF_BIND_ADDR"),
        "expected InvalidEnvVar(BIZPROF_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn crawl_max_pages_override() {
    let mut map = HashMap::new();
    map.insert("BIZPROF_CRAWL_MAX_PAGES", "5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.crawl_max_pages, 5);
}

#[test]
fn crawl_max_pages_invalid() {
    let mut map = HashMap::new();
    map.insert("BIZPROF_CRAWL_MAX_PAGES", "lots");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROF_CRAWL_MAX_PAGES"),
        "expected InvalidEnvVar(BIZPROF_CRAWL_MAX_PAGES), got: {result:?}"
    );
}

#[test]
fn crawl_max_pages_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BIZPROF_CRAWL_MAX_PAGES", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROF_CRAWL_MAX_PAGES"),
        "expected InvalidEnvVar(BIZPROF_CRAWL_MAX_PAGES), got: {result:?}"
    );
}

#[test]
fn crawl_concurrency_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BIZPROF_CRAWL_CONCURRENCY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROF_CRAWL_CONCURRENCY"),
        "expected InvalidEnvVar(BIZPROF_CRAWL_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn fallback_policy_values() {
    for (raw, expected) in [
        ("when-thin", FallbackPolicy::WhenThin),
        ("always", FallbackPolicy::Always),
        ("never", FallbackPolicy::Never),
    ] {
        let mut map = HashMap::new();
        map.insert("BIZPROF_FALLBACK_POLICY", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.fallback_policy, expected);
    }
}

#[test]
fn fallback_policy_unknown_is_rejected() {
    let mut map = HashMap::new();
    map.insert("BIZPROF_FALLBACK_POLICY", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BIZPROF_FALLBACK_POLICY"),
        "expected InvalidEnvVar(BIZPROF_FALLBACK_POLICY), got: {result:?}"
    );
}

#[test]
fn blank_api_key_is_treated_as_missing() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.openai_api_key.is_none());
}

#[test]
fn openai_base_url_trailing_slash_is_trimmed() {
    let mut map = HashMap::new();
    map.insert("OPENAI_BASE_URL", "http://localhost:9999/v1/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.openai_base_url, "http://localhost:9999/v1");
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("OPENAI_API_KEY", "sk-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("sk-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
