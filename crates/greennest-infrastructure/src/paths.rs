//! Path management for GreenNest configuration files.
//!
//! ```text
//! ~/.config/greennest/         # Config directory (platform equivalent elsewhere)
//! └── config.toml              # Application configuration
//! ```

use std::path::PathBuf;

use greennest_core::error::{GreenNestError, Result};

const APP_DIR: &str = "greennest";
const CONFIG_FILE: &str = "config.toml";

pub struct GreenNestPaths;

impl GreenNestPaths {
    /// Returns the GreenNest configuration directory.
    ///
    /// # Errors
    ///
    /// `Config` when the platform has no configuration directory.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| GreenNestError::config("Cannot find configuration directory"))
    }

    /// Returns the path of `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_in_app_dir() {
        if let Ok(path) = GreenNestPaths::config_file() {
            assert!(path.ends_with("greennest/config.toml"));
        }
    }
}
