use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_LLM_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_APP_REFERER: &str = "https://github.com/ayayo888/shopping-assistant";
const DEFAULT_APP_TITLE: &str = "Shopping Assistant";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    /// Per-attempt timeout on the provider call.
    pub llm_timeout_secs: u64,
    /// Extra attempts after the first one. 0 = single best-effort call.
    pub llm_max_retries: u32,
    pub llm_retry_backoff_ms: u64,
    pub app_referer: String,
    pub app_title: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            openrouter_api_key: require("OPENROUTER_API_KEY")?,
            llm_base_url: or_default("OPENAI_API_BASE", DEFAULT_LLM_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            llm_model: or_default("LLM_MODEL", DEFAULT_LLM_MODEL),
            llm_timeout_secs: or_default("LLM_TIMEOUT_SECS", "30")
                .parse()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            llm_max_retries: or_default("LLM_MAX_RETRIES", "0")
                .parse()
                .context("LLM_MAX_RETRIES must be a non-negative integer")?,
            llm_retry_backoff_ms: or_default("LLM_RETRY_BACKOFF_MS", "500")
                .parse()
                .context("LLM_RETRY_BACKOFF_MS must be a whole number of milliseconds")?,
            app_referer: or_default("APP_REFERER", DEFAULT_APP_REFERER),
            app_title: or_default("APP_TITLE", DEFAULT_APP_TITLE),
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied_when_only_key_set() {
        let config = Config::from_lookup(lookup_from(&[("OPENROUTER_API_KEY", "sk-test")])).unwrap();
        assert_eq!(config.openrouter_api_key, "sk-test");
        assert_eq!(config.llm_base_url, DEFAULT_LLM_BASE_URL);
        assert_eq!(config.llm_model, "openai/gpt-4o-mini");
        assert_eq!(config.llm_timeout_secs, 30);
        assert_eq!(config.llm_max_retries, 0);
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_an_error() {
        assert!(Config::from_lookup(lookup_from(&[("OPENROUTER_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_overrides_and_trailing_slash() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("OPENAI_API_BASE", "http://localhost:9000/v1/"),
            ("LLM_MAX_RETRIES", "3"),
            ("PORT", "3001"),
        ]))
        .unwrap();
        assert_eq!(config.llm_base_url, "http://localhost:9000/v1");
        assert_eq!(config.llm_max_retries, 3);
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let result = Config::from_lookup(lookup_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("PORT", "not-a-port"),
        ]));
        assert!(result.is_err());
    }
}
