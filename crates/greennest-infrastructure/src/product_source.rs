//! Product sources: the static product feed over HTTP or from disk.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use greennest_core::catalog::{Product, ProductSource, decode_products, decode_products_str};
use greennest_core::config::CatalogConfig;
use greennest_core::error::{GreenNestError, Result};
use tracing::{debug, info};

/// Fetches the product feed with a single plain GET.
#[derive(Debug, Clone)]
pub struct HttpProductSource {
    client: reqwest::Client,
    url: String,
}

impl HttpProductSource {
    /// # Errors
    ///
    /// `Config` when the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GreenNestError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ProductSource for HttpProductSource {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        debug!(url = %self.url, "Fetching product feed");
        let document: serde_json::Value = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let products = decode_products(document)?;
        info!(count = products.len(), url = %self.url, "Product feed loaded");
        Ok(products)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the product feed from a JSON file.
#[derive(Debug, Clone)]
pub struct FileProductSource {
    path: PathBuf,
}

impl FileProductSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProductSource for FileProductSource {
    async fn fetch_products(&self) -> Result<Vec<Product>> {
        debug!(path = %self.path.display(), "Reading product feed");
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            GreenNestError::data_load(format!("{}: {e}", self.path.display()))
        })?;
        let products = decode_products_str(&text)?;
        info!(count = products.len(), path = %self.path.display(), "Product feed loaded");
        Ok(products)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Picks the source named by `config.source`: http(s) URLs go over the
/// network, anything else is a file path.
///
/// # Errors
///
/// `Config` when the HTTP client cannot be built.
pub fn product_source_from_config(config: &CatalogConfig) -> Result<Arc<dyn ProductSource>> {
    if config.is_remote() {
        let source =
            HttpProductSource::new(&config.source, Duration::from_secs(config.timeout_secs))?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(FileProductSource::new(&config.source)))
    }
}
