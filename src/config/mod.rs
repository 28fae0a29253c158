//! Configuration management.
//!
//! Settings come from, in increasing priority:
//!
//! 1. built-in defaults
//! 2. a TOML file (`./research-gap-finder.toml` or the per-user config dir)
//! 3. `GAP_FINDER__<SECTION>__<KEY>` environment variables
//! 4. the legacy variables `SEMANTIC_SCHOLAR_RATE_LIMIT`, `MAX_API_RETRIES`,
//!    `REQUEST_TIMEOUT`, `ENABLE_CACHE` and `CACHE_DURATION`
//!
//! API keys fall back to `SEMANTIC_SCHOLAR_API_KEY` and `CROSSREF_API_KEY`.

mod file_config;

pub use file_config::ConfigFile;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "research-gap-finder.toml";
/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "GAP_FINDER";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API keys for the academic sources
    #[serde(default)]
    pub api_keys: ApiKeys,

    /// Search, retry, rate limit and cache settings
    #[serde(default)]
    pub search: SearchSettings,

    /// Source endpoints
    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeys {
    /// Semantic Scholar API key (optional, for higher rate limits)
    #[serde(default)]
    pub semantic_scholar: Option<String>,

    /// Crossref Plus API token (optional)
    #[serde(default)]
    pub crossref: Option<String>,
}

impl Default for ApiKeys {
    fn default() -> Self {
        Self::from_env(|name| std::env::var(name).ok())
    }
}

const SEMANTIC_KEY_VAR: &str = "SEMANTIC_SCHOLAR_API_KEY";
const CROSSREF_KEY_VAR: &str = "CROSSREF_API_KEY";
const SEMANTIC_KEY_PLACEHOLDER: &str = "your_semantic_scholar_api_key_here";
const CROSSREF_KEY_PLACEHOLDER: &str = "your_crossref_api_key_here";

/// A key is usable when non-blank and not a template placeholder
fn usable_key(key: Option<String>, placeholder: &str) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != placeholder)
}

impl ApiKeys {
    /// Keys read through `lookup` (normally the process environment)
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            semantic_scholar: usable_key(lookup(SEMANTIC_KEY_VAR), SEMANTIC_KEY_PLACEHOLDER),
            crossref: usable_key(lookup(CROSSREF_KEY_VAR), CROSSREF_KEY_PLACEHOLDER),
        }
    }

    /// Drop placeholders and fill missing keys from `lookup`
    pub fn fill_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let env = Self::from_env(lookup);
        self.semantic_scholar =
            usable_key(self.semantic_scholar.take(), SEMANTIC_KEY_PLACEHOLDER).or(env.semantic_scholar);
        self.crossref = usable_key(self.crossref.take(), CROSSREF_KEY_PLACEHOLDER).or(env.crossref);
    }
}

/// Search pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Minimum seconds between Semantic Scholar requests
    pub rate_limit_seconds: f64,
    /// Total attempts per source request
    pub max_retries: u32,
    pub retry_backoff_base: f64,
    pub request_timeout_seconds: u64,
    pub cache_enabled: bool,
    pub cache_duration_seconds: u64,
    /// Papers kept after ranking
    pub max_results: usize,
    pub per_source_limit: usize,
    /// Query variants searched per topic
    pub max_query_variants: usize,
    /// Pause between query variants
    pub query_delay_seconds: f64,
    /// Window for recent-paper searches
    pub recent_years: i32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            rate_limit_seconds: 1.1,
            max_retries: 3,
            retry_backoff_base: 2.0,
            request_timeout_seconds: 15,
            cache_enabled: true,
            cache_duration_seconds: 3600,
            max_results: 20,
            per_source_limit: 20,
            max_query_variants: 3,
            query_delay_seconds: 1.5,
            recent_years: 5,
        }
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    target: &mut T,
) {
    if let Some(raw) = lookup(name) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring unparsable {}={:?}", name, raw),
        }
    }
}

impl SearchSettings {
    /// Apply the legacy single-variable overrides read through `lookup`.
    ///
    /// An unparsable number leaves the current value in place.
    /// `ENABLE_CACHE` enables the cache only when it reads "true".
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        parse_override(&lookup, "SEMANTIC_SCHOLAR_RATE_LIMIT", &mut self.rate_limit_seconds);
        parse_override(&lookup, "MAX_API_RETRIES", &mut self.max_retries);
        parse_override(&lookup, "REQUEST_TIMEOUT", &mut self.request_timeout_seconds);
        parse_override(&lookup, "CACHE_DURATION", &mut self.cache_duration_seconds);

        if let Some(raw) = lookup("ENABLE_CACHE") {
            self.cache_enabled = raw.trim().eq_ignore_ascii_case("true");
        }
    }
}

/// API base URLs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub semantic_scholar: String,
    pub crossref: String,
    /// Contact address sent to Crossref's polite pool
    pub mailto: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            semantic_scholar: crate::sources::SEMANTIC_API_BASE.to_string(),
            crossref: crate::sources::CROSSREF_API_BASE.to_string(),
            mailto: crate::sources::DEFAULT_MAILTO.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "json" for JSON lines, anything else for plain text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Config error: {0}")]
    Load(#[from] config::ConfigError),
}

/// First existing config file: `./research-gap-finder.toml`, then
/// `<config dir>/research-gap-finder/config.toml`
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    default_config_path().filter(|p| p.is_file())
}

/// Per-user config file location, whether or not it exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("research-gap-finder").join("config.toml"))
}

/// Load configuration from `path` (or a discovered file) plus environment
/// overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// [`load_config`] with legacy variables and API keys read through `lookup`
pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let file = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config_file(),
    };

    let mut builder = config::Config::builder();
    if let Some(file) = &file {
        tracing::debug!("Loading configuration from {}", file.display());
        builder = builder.add_source(config::File::from(file.as_path()).required(true));
    }
    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.search.apply_env_overrides(&lookup);
    config.api_keys.fill_from(&lookup);
    Ok(config)
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    let mut config = Config::default();
    config
        .search
        .apply_env_overrides(|name| std::env::var(name).ok());
    config
}

/// Mask an API key for display: first 8 and last 4 characters
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 12 {
        return "***masked***".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Basic plausibility check on an API key's length
pub fn api_key_format_ok(service: &str, key: &str) -> bool {
    let len = key.chars().count();
    match service {
        "semantic_scholar" => len > 10,
        _ => len > 5,
    }
}

/// Displayable summary of the effective configuration, keys masked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub semantic_scholar_key: Option<String>,
    pub crossref_key: Option<String>,
    pub rate_limit_seconds: f64,
    pub max_retries: u32,
    pub request_timeout_seconds: u64,
    pub cache_enabled: bool,
    pub cache_duration_seconds: u64,
    pub max_results: usize,
    pub log_level: String,
}

impl Config {
    pub fn summary(&self) -> ConfigSummary {
        let masked = |service: &str, key: &Option<String>| {
            key.as_deref().map(|k| {
                if api_key_format_ok(service, k) {
                    mask_api_key(k)
                } else {
                    format!("{} (unexpected format)", mask_api_key(k))
                }
            })
        };

        ConfigSummary {
            semantic_scholar_key: masked("semantic_scholar", &self.api_keys.semantic_scholar),
            crossref_key: masked("crossref", &self.api_keys.crossref),
            rate_limit_seconds: self.search.rate_limit_seconds,
            max_retries: self.search.max_retries,
            request_timeout_seconds: self.search.request_timeout_seconds,
            cache_enabled: self.search.cache_enabled,
            cache_duration_seconds: self.search.cache_duration_seconds,
            max_results: self.search.max_results,
            log_level: self.logging.level.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_search_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.rate_limit_seconds, 1.1);
        assert_eq!(search.max_retries, 3);
        assert_eq!(search.retry_backoff_base, 2.0);
        assert_eq!(search.request_timeout_seconds, 15);
        assert_eq!(search.cache_duration_seconds, 3600);
        assert_eq!(search.max_results, 20);
        assert!(search.cache_enabled);
    }

    #[test]
    fn test_env_overrides() {
        let mut search = SearchSettings::default();
        search.apply_env_overrides(env(&[
            ("SEMANTIC_SCHOLAR_RATE_LIMIT", "2.5"),
            ("MAX_API_RETRIES", "5"),
            ("REQUEST_TIMEOUT", "not-a-number"),
            ("ENABLE_CACHE", "False"),
        ]));
        assert_eq!(search.rate_limit_seconds, 2.5);
        assert_eq!(search.max_retries, 5);
        assert_eq!(search.request_timeout_seconds, 15);
        assert!(!search.cache_enabled);
        assert_eq!(search.cache_duration_seconds, 3600);
    }

    #[test]
    fn test_api_keys_skip_placeholders() {
        let keys = ApiKeys::from_env(env(&[
            ("SEMANTIC_SCHOLAR_API_KEY", "your_semantic_scholar_api_key_here"),
            ("CROSSREF_API_KEY", " crossref-token "),
        ]));
        assert_eq!(keys.semantic_scholar, None);
        assert_eq!(keys.crossref.as_deref(), Some("crossref-token"));

        let mut configured = ApiKeys {
            semantic_scholar: Some("from-file-key".to_string()),
            crossref: Some("".to_string()),
        };
        configured.fill_from(env(&[("CROSSREF_API_KEY", "env-token")]));
        assert_eq!(configured.semantic_scholar.as_deref(), Some("from-file-key"));
        assert_eq!(configured.crossref.as_deref(), Some("env-token"));
    }

    #[test]
    fn test_mask_api_key() {
        assert_eq!(mask_api_key("abcdefghijklmnop"), "abcdefgh...mnop");
        assert_eq!(mask_api_key("abcdefghijk"), "***masked***");
        assert_eq!(mask_api_key(""), "***masked***");
    }

    #[test]
    fn test_summary_masks_keys() {
        let mut config = Config::default();
        config.api_keys.semantic_scholar = Some("s2-key-1234567890".to_string());
        config.api_keys.crossref = None;

        let summary = config.summary();
        assert_eq!(summary.semantic_scholar_key.as_deref(), Some("s2-key-1...7890"));
        assert_eq!(summary.crossref_key, None);
        assert_eq!(summary.rate_limit_seconds, 1.1);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[search]
max_results = 7
rate_limit_seconds = 2.0

[endpoints]
mailto = "me@example.org"
"#,
        )
        .unwrap();

        let config = load_config_with(Some(path.as_path()), env(&[("MAX_API_RETRIES", "9")])).unwrap();
        assert_eq!(config.search.max_results, 7);
        assert_eq!(config.search.rate_limit_seconds, 2.0);
        assert_eq!(config.search.max_retries, 9);
        assert_eq!(config.search.per_source_limit, 20);
        assert_eq!(config.endpoints.mailto, "me@example.org");
        assert_eq!(config.endpoints.crossref, "https://api.crossref.org");
    }

    #[test]
    fn test_load_config_missing_file() {
        let path = PathBuf::from("/nonexistent/research-gap-finder.toml");
        assert!(load_config_with(Some(path.as_path()), env(&[])).is_err());
    }
}
