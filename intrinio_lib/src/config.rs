//! Run configuration: API credentials, endpoint, retry and fan-out settings.
//!
//! Resolved from environment variables or a TOML file before any network
//! call is made. The key itself is never logged.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use intrinio_api::{RetryPolicy, DEFAULT_BASE_URL};
use serde::Deserialize;

use crate::error::IntrinioError;

pub const ENV_API_KEY: &str = "INTRINIO_API_KEY";
pub const ENV_BASE_URL: &str = "INTRINIO_BASE_URL";
pub const ENV_RETRY_MAX: &str = "INTRINIO_RETRY_MAX";
pub const ENV_RETRY_DELAY_MS: &str = "INTRINIO_RETRY_DELAY_MS";
pub const ENV_MAX_PAGES: &str = "INTRINIO_MAX_PAGES";
pub const ENV_CONCURRENCY: &str = "INTRINIO_CONCURRENCY";
pub const ENV_PAGE_SIZE: &str = "INTRINIO_PAGE_SIZE";

#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Ceiling on pages per ticker. Unset follows `next_page` until exhausted.
    #[serde(default)]
    pub max_pages: Option<usize>,
    /// Cap on tickers fetched at once. Unset fetches every ticker concurrently.
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_retries() -> usize {
    RetryPolicy::default().max_retries
}

fn default_retry_delay_ms() -> u64 {
    RetryPolicy::default().delay.as_millis() as u64
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("max_pages", &self.max_pages)
            .field("concurrency", &self.concurrency)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl Config {
    /// A configuration with defaults for everything but the key.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: default_base_url(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            max_pages: None,
            concurrency: None,
            page_size: None,
        }
    }

    /// Reads the configuration from `INTRINIO_*` environment variables.
    pub fn from_env() -> Result<Self, IntrinioError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IntrinioError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| IntrinioError::Config(format!("{} is not set", ENV_API_KEY)))?;

        let mut config = Self::new(&api_key);
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(max_retries) = parse_var(&lookup, ENV_RETRY_MAX)? {
            config.max_retries = max_retries;
        }
        if let Some(delay) = parse_var(&lookup, ENV_RETRY_DELAY_MS)? {
            config.retry_delay_ms = delay;
        }
        config.max_pages = parse_var(&lookup, ENV_MAX_PAGES)?;
        config.concurrency = parse_var(&lookup, ENV_CONCURRENCY)?;
        config.page_size = parse_var(&lookup, ENV_PAGE_SIZE)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document with the same keys as the struct fields.
    pub fn from_toml_str(input: &str) -> Result<Self, IntrinioError> {
        let config: Config = toml::from_str(input)
            .map_err(|e| IntrinioError::Config(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, IntrinioError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            IntrinioError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms))
    }

    fn validate(&self) -> Result<(), IntrinioError> {
        if self.api_key.trim().is_empty() {
            return Err(IntrinioError::Config("api_key is empty".to_string()));
        }
        if self.max_pages == Some(0) {
            return Err(IntrinioError::Config("max_pages must be >= 1".to_string()));
        }
        if self.concurrency == Some(0) {
            return Err(IntrinioError::Config("concurrency must be >= 1".to_string()));
        }
        if let Some(page_size) = self.page_size {
            crate::validation::validate_page_size(page_size)
                .map_err(|e| IntrinioError::Config(e.to_string()))?;
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, IntrinioError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            IntrinioError::Config(format!("{} has invalid value '{}'", key, raw.trim()))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));

        let err = Config::from_lookup(lookup_from(&[(ENV_API_KEY, "  ")])).unwrap_err();
        assert!(matches!(err, IntrinioError::Config(_)));
    }

    #[test]
    fn env_defaults() {
        let config = Config::from_lookup(lookup_from(&[(ENV_API_KEY, "abc")])).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.max_pages, None);
        assert_eq!(config.concurrency, None);
    }

    #[test]
    fn env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            (ENV_API_KEY, "abc"),
            (ENV_BASE_URL, "http://localhost:9000"),
            (ENV_RETRY_MAX, "2"),
            (ENV_RETRY_DELAY_MS, "10"),
            (ENV_MAX_PAGES, "50"),
            (ENV_CONCURRENCY, "4"),
            (ENV_PAGE_SIZE, "1000"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(
            config.retry_policy(),
            RetryPolicy::new(2, Duration::from_millis(10))
        );
        assert_eq!(config.max_pages, Some(50));
        assert_eq!(config.concurrency, Some(4));
        assert_eq!(config.page_size, Some(1000));
    }

    #[test]
    fn env_rejects_garbage_numbers() {
        let err =
            Config::from_lookup(lookup_from(&[(ENV_API_KEY, "abc"), (ENV_RETRY_MAX, "lots")]))
                .unwrap_err();
        assert!(err.to_string().contains(ENV_RETRY_MAX));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(ENV_API_KEY, "abc"), (ENV_CONCURRENCY, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn toml_with_defaults() {
        let config = Config::from_toml_str(r#"api_key = "xyz""#).unwrap();
        assert_eq!(config.api_key, "xyz");
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay_ms, 100);
    }

    #[test]
    fn toml_full() {
        let config = Config::from_toml_str(
            r#"
            api_key = "xyz"
            base_url = "http://localhost:9000"
            max_retries = 1
            retry_delay_ms = 5
            max_pages = 10
            concurrency = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.max_pages, Some(10));
        assert_eq!(config.concurrency, Some(8));
        assert_eq!(config.retry_policy().max_retries, 1);
    }

    #[test]
    fn toml_unknown_key_is_an_error() {
        assert!(Config::from_toml_str("api_key = \"x\"\ntoken = \"y\"").is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let config = Config::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
