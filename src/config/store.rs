//! Thread-safe configuration storage.
//!
//! Simple in-memory config container with interior mutability, shared
//! between the binary and the runtime components it builds.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::loader::ConfigError;
use crate::config::types::Config;

/// Thread-safe config container with interior mutability.
#[derive(Clone)]
pub struct ConfigStore {
    inner: Arc<RwLock<Config>>,
    path: PathBuf,
}

impl ConfigStore {
    /// Create a new ConfigStore from initial config and path.
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            path,
        }
    }

    /// Get a clone of the current config.
    pub fn get(&self) -> Config {
        self.inner.read().clone()
    }

    /// Replace the current config after validating it.
    pub fn replace(&self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        *self.inner.write() = config;
        Ok(())
    }

    /// Reload config from the file.
    ///
    /// On failure the old config is kept and the error returned.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let config = Config::load_from(&self.path)?;
        *self.inner.write() = config;
        tracing::info!(path = %self.path.display(), "Configuration reloaded");
        Ok(())
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
