//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the application
//! configuration from the configuration file (~/.config/greennest/config.toml).

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use greennest_core::config::AppConfig;
use greennest_core::error::{GreenNestError, Result};
use tracing::{debug, warn};

use crate::paths::GreenNestPaths;

/// Configuration service that loads and caches the application configuration.
///
/// A missing file yields [`AppConfig::default`]. The configuration is read on
/// first access and cached until [`ConfigService::invalidate_cache`].
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a service for the default config location.
    ///
    /// # Errors
    ///
    /// `Config` when the configuration directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(GreenNestPaths::config_file()?))
    }

    /// Creates a service reading `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    ///
    /// An unreadable or invalid file is logged and replaced by defaults.
    pub fn get_config(&self) -> AppConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref config) = *cached {
                return config.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Falling back to default config");
            AppConfig::default()
        });

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(loaded.clone());
        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = None;
    }

    /// Reads the config file.
    ///
    /// # Errors
    ///
    /// `Io` when the file exists but cannot be read, `Serialization` when it
    /// is not valid TOML for [`AppConfig`].
    pub fn load(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(AppConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes `config` and refreshes the cache.
    ///
    /// The file is written to a temporary sibling and renamed into place.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        let parent = self
            .path
            .parent()
            .ok_or_else(|| GreenNestError::config("Config path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;

        let temp_path = self.path.with_extension("toml.tmp");
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, &self.path)?;

        let mut cached = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *cached = Some(config.clone());
        Ok(())
    }
}
