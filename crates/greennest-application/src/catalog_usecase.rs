//! Catalog, home and plant detail pages over a load-once product cache.

use std::sync::Arc;

use greennest_core::catalog::{
    self, CatalogQuery, CatalogView, FEATURED_PLANT_ID, HomeView, Product, ProductSource,
    TOP_RATED_COUNT,
};
use greennest_core::config::CatalogConfig;
use greennest_core::error::Result;
use tokio::sync::RwLock;
use tracing::{error, info};

#[derive(Debug, Clone)]
enum LoadState {
    NotLoaded,
    Loaded(Arc<Vec<Product>>),
    /// The fetch failed; the catalog stays empty for the rest of the session
    Failed,
}

/// Serves the catalog pages from a product collection fetched at most once.
///
/// A failed fetch is reported to the caller that triggered it and then
/// leaves every view empty. There is no retry.
pub struct CatalogUseCase {
    source: Arc<dyn ProductSource>,
    state: RwLock<LoadState>,
    top_rated_count: usize,
    featured_plant_id: u32,
}

impl CatalogUseCase {
    pub fn new(source: Arc<dyn ProductSource>) -> Self {
        Self {
            source,
            state: RwLock::new(LoadState::NotLoaded),
            top_rated_count: TOP_RATED_COUNT,
            featured_plant_id: FEATURED_PLANT_ID,
        }
    }

    /// Uses the home page settings from `config`.
    pub fn with_config(source: Arc<dyn ProductSource>, config: &CatalogConfig) -> Self {
        Self {
            top_rated_count: config.top_rated_count,
            featured_plant_id: config.featured_plant_id,
            ..Self::new(source)
        }
    }

    /// Returns the product collection, fetching it on first use.
    ///
    /// # Errors
    ///
    /// `DataLoadFailed` from the fetch that failed. Later calls return an
    /// empty collection.
    pub async fn products(&self) -> Result<Arc<Vec<Product>>> {
        {
            let state = self.state.read().await;
            match &*state {
                LoadState::Loaded(products) => return Ok(products.clone()),
                LoadState::Failed => return Ok(Arc::new(Vec::new())),
                LoadState::NotLoaded => {}
            }
        }

        let mut state = self.state.write().await;
        // Another caller may have finished the fetch while we waited
        match &*state {
            LoadState::Loaded(products) => return Ok(products.clone()),
            LoadState::Failed => return Ok(Arc::new(Vec::new())),
            LoadState::NotLoaded => {}
        }

        match self.source.fetch_products().await {
            Ok(products) => {
                info!(count = products.len(), source = %self.source.describe(), "Catalog loaded");
                let products = Arc::new(products);
                *state = LoadState::Loaded(products.clone());
                Ok(products)
            }
            Err(e) => {
                error!(source = %self.source.describe(), error = %e, "Catalog load failed");
                *state = LoadState::Failed;
                Err(e)
            }
        }
    }

    /// The catalog page for `query`.
    pub async fn catalog_page(&self, query: &CatalogQuery) -> Result<CatalogView> {
        let products = self.products().await?;
        Ok(CatalogView::build(&products, query))
    }

    /// Top-rated products and the featured plant.
    pub async fn home_page(&self) -> Result<HomeView> {
        let products = self.products().await?;
        Ok(HomeView::build(
            &products,
            self.top_rated_count,
            self.featured_plant_id,
        ))
    }

    /// The plant for the `:id` segment of `/plants/:id`, if any.
    pub async fn plant_detail(&self, raw_id: &str) -> Result<Option<Product>> {
        let products = self.products().await?;
        Ok(catalog::find_by_path_id(&products, raw_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use greennest_core::error::GreenNestError;
    use greennest_infrastructure::FileProductSource;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingSource {
        products: Option<Vec<Product>>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl ProductSource for CountingSource {
        async fn fetch_products(&self) -> Result<Vec<Product>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.products
                .clone()
                .ok_or_else(|| GreenNestError::data_load("HTTP 500"))
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn plant(id: u32, name: &str, category: &str, rating: f64) -> Product {
        Product {
            plant_id: id,
            plant_name: name.to_string(),
            description: String::new(),
            category: category.to_string(),
            care_level: "Easy".to_string(),
            price: Some(15.0),
            rating: Some(rating),
            available_stock: Some(3),
            provider_name: "GreenNest".to_string(),
            image: String::new(),
        }
    }

    fn counting(products: Option<Vec<Product>>) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            products,
            fetches: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_fetches_once_across_pages() {
        let source = counting(Some(vec![
            plant(1, "Aloe Vera", "Succulent", 4.5),
            plant(3, "Snake Plant", "Air Purifier", 4.8),
        ]));
        let catalog = CatalogUseCase::new(source.clone());

        let view = catalog
            .catalog_page(&CatalogQuery::new("aloe", "All"))
            .await
            .unwrap();
        let home = catalog.home_page().await.unwrap();
        let detail = catalog.plant_detail("3").await.unwrap();

        assert_eq!(view.summary(), "Showing 1 of 2 plants");
        assert_eq!(home.top_rated[0].plant_id, 3);
        assert_eq!(home.featured.map(|p| p.plant_name), Some("Snake Plant".to_string()));
        assert_eq!(detail.map(|p| p.plant_id), Some(3));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_load_failure_is_reported_once_then_empty() {
        let source = counting(None);
        let catalog = CatalogUseCase::new(source.clone());

        let err = catalog.home_page().await.unwrap_err();
        assert!(err.is_data_load_failure());

        let view = catalog.catalog_page(&CatalogQuery::default()).await.unwrap();
        assert!(view.filtered.is_empty());
        assert_eq!(view.categories, vec!["All"]);
        assert!(catalog.plant_detail("1").await.unwrap().is_none());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_config_changes_home_view() {
        let source = counting(Some(vec![
            plant(1, "Pothos", "Trailing", 4.0),
            plant(2, "Calathea", "Tropical", 4.9),
            plant(3, "Snake Plant", "Air Purifier", 4.8),
        ]));
        let config = CatalogConfig {
            top_rated_count: 1,
            featured_plant_id: 1,
            ..CatalogConfig::default()
        };
        let catalog = CatalogUseCase::with_config(source, &config);

        let home = catalog.home_page().await.unwrap();
        assert_eq!(home.top_rated.len(), 1);
        assert_eq!(home.top_rated[0].plant_id, 2);
        assert_eq!(home.featured.map(|p| p.plant_id), Some(1));
    }

    #[tokio::test]
    async fn test_file_backed_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plants.json");
        std::fs::write(
            &path,
            r#"[{"plantId": 3, "plantName": "Snake Plant", "category": "Air Purifier"}]"#,
        )
        .unwrap();
        let catalog = CatalogUseCase::new(Arc::new(FileProductSource::new(&path)));

        let home = catalog.home_page().await.unwrap();
        assert!(home.featured.is_some());
    }
}
