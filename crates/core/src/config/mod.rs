//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (GIFSTASH_*)
//! 2. TOML config file (if GIFSTASH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (GIFSTASH_*)
/// 2. TOML config file (if GIFSTASH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding blobs and the index snapshot.
    ///
    /// Set via GIFSTASH_STORE_ROOT environment variable.
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via GIFSTASH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per gif.
    ///
    /// Set via GIFSTASH_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via GIFSTASH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    ///
    /// Set via GIFSTASH_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Refuse to fetch from private, loopback and link-local addresses.
    ///
    /// Set via GIFSTASH_BLOCK_PRIVATE_ADDRESSES environment variable.
    #[serde(default = "default_true")]
    pub block_private_addresses: bool,

    /// Store response bodies even when the status is not 2xx.
    ///
    /// Set via GIFSTASH_ACCEPT_ERROR_STATUS environment variable.
    #[serde(default)]
    pub accept_error_status: bool,

    /// How long a random pick stays pinned, in seconds.
    ///
    /// Set via GIFSTASH_RANDOM_PIN_SECS environment variable.
    #[serde(default = "default_random_pin_secs")]
    pub random_pin_secs: u64,
}

fn default_store_root() -> PathBuf {
    PathBuf::from("./gifs")
}

fn default_user_agent() -> String {
    "gifstash/0.1".into()
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_random_pin_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_root: default_store_root(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            block_private_addresses: true,
            accept_error_status: false,
            random_pin_secs: default_random_pin_secs(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Random pin window as Duration.
    pub fn random_pin(&self) -> Duration {
        Duration::from_secs(self.random_pin_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `GIFSTASH_`
    /// 2. TOML file from `GIFSTASH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("GIFSTASH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("GIFSTASH_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        Self::from_figment(figment)
    }

    /// Extract and validate a configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.store_root, PathBuf::from("./gifs"));
        assert_eq!(config.user_agent, "gifstash/0.1");
        assert_eq!(config.max_bytes, 20 * 1024 * 1024);
        assert_eq!(config.timeout_ms, 15_000);
        assert_eq!(config.max_redirects, 5);
        assert!(config.block_private_addresses);
        assert!(!config.accept_error_status);
        assert_eq!(config.random_pin_secs, 300);
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(15_000));
        assert_eq!(config.random_pin(), Duration::from_secs(300));
    }

    #[test]
    fn test_toml_layer_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(
            r#"
            store_root = "/var/lib/gifstash"
            random_pin_secs = 60
            block_private_addresses = false
            "#,
        ));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/var/lib/gifstash"));
        assert_eq!(config.random_pin_secs, 60);
        assert!(!config.block_private_addresses);
        assert_eq!(config.user_agent, "gifstash/0.1");
    }

    #[test]
    fn test_from_figment_validates() {
        let figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string("random_pin_secs = 0"));

        let result = AppConfig::from_figment(figment);
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "random_pin_secs"));
    }

    #[test]
    fn test_from_figment_bad_type() {
        let figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string("max_bytes = \"lots\""));

        let result = AppConfig::from_figment(figment);
        assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
    }
}
