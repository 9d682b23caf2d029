use serde::{Deserialize, Serialize};

use crate::catalog::{FEATURED_PLANT_ID, TOP_RATED_COUNT};

/// Default location of the product feed.
pub const DEFAULT_PRODUCT_SOURCE: &str = "http://localhost:5173/plants.json";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// URL (http/https) or file path of the product JSON array
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_featured_plant_id")]
    pub featured_plant_id: u32,
    #[serde(default = "default_top_rated_count")]
    pub top_rated_count: usize,
    /// HTTP timeout for the product fetch, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_source() -> String {
    DEFAULT_PRODUCT_SOURCE.to_string()
}

fn default_featured_plant_id() -> u32 {
    FEATURED_PLANT_ID
}

fn default_top_rated_count() -> usize {
    TOP_RATED_COUNT
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            featured_plant_id: default_featured_plant_id(),
            top_rated_count: default_top_rated_count(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn is_remote(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. "info" or "greennest_core=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [catalog]
            source = "./plants.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.catalog.source, "./plants.json");
        assert!(!config.catalog.is_remote());
        assert_eq!(config.catalog.featured_plant_id, 3);
        assert_eq!(config.catalog.top_rated_count, 6);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_source_is_remote() {
        assert!(AppConfig::default().catalog.is_remote());
    }
}
