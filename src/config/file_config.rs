//! Configuration file support for research-gap-finder.
//!
//! # Configuration File Format
//!
//! ```toml
//! [api_keys]
//! semantic_scholar = "your-api-key"
//! crossref = "your-crossref-plus-token"
//!
//! [search]
//! rate_limit_seconds = 1.1
//! max_retries = 3
//! retry_backoff_base = 2.0
//! request_timeout_seconds = 15
//! cache_enabled = true
//! cache_duration_seconds = 3600
//! max_results = 20
//! per_source_limit = 20
//! max_query_variants = 3
//! query_delay_seconds = 1.5
//! recent_years = 5
//!
//! [endpoints]
//! semantic_scholar = "https://api.semanticscholar.org/graph/v1"
//! crossref = "https://api.crossref.org"
//! mailto = "you@example.org"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{Config, ConfigError, Endpoints, LoggingConfig, SearchSettings};

/// On-disk configuration.
///
/// Unlike [`Config`], absent API keys stay absent instead of being read from
/// the environment, so a saved file never captures keys that only lived in
/// the shell.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_keys: ApiKeysConfig,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API keys as written in the file
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_scholar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crossref: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Effective configuration: file values, missing keys from the
    /// environment
    pub fn into_config(self) -> Config {
        let mut config = Config {
            api_keys: super::ApiKeys {
                semantic_scholar: self.api_keys.semantic_scholar,
                crossref: self.api_keys.crossref,
            },
            search: self.search,
            endpoints: self.endpoints,
            logging: self.logging,
        };
        config.api_keys.fill_from(|name| std::env::var(name).ok());
        config
    }
}
