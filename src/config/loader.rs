use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/centro-control/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("centro-control").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }
        Self::load_from(&path)
    }

    /// Loads, parses and validates a specific config file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The base URL is an absolute http(s) URL
    /// - Endpoints are absolute paths and the detail endpoint carries `{id}`
    /// - The per-attempt timeout is non-zero
    /// - Retryable statuses are 5xx codes
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.api.base_url).map_err(|e| invalid(format!(
            "Invalid base_url '{}': {}",
            self.api.base_url, e
        )))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(invalid(format!(
                "base_url must use http or https, got '{}'",
                base.scheme()
            )));
        }

        for (name, endpoint) in [
            ("list_endpoint", &self.api.list_endpoint),
            ("detail_endpoint", &self.api.detail_endpoint),
            ("health_endpoint", &self.api.health_endpoint),
        ] {
            if !endpoint.starts_with('/') {
                return Err(invalid(format!("{} must start with '/': '{}'", name, endpoint)));
            }
        }

        if !self.api.detail_endpoint.contains("{id}") {
            return Err(invalid(format!(
                "detail_endpoint must contain an {{id}} placeholder: '{}'",
                self.api.detail_endpoint
            )));
        }

        if self.api.timeout_ms == 0 {
            return Err(invalid("timeout_ms must be greater than zero".to_string()));
        }

        if let Some(status) = self
            .retry
            .retryable_statuses
            .iter()
            .find(|s| !(500..=599).contains(*s))
        {
            return Err(invalid(format!(
                "Retryable status {} is not a server error (5xx)",
                status
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError { message }
}
