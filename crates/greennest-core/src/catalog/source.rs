//! Product data source contract.

use async_trait::async_trait;

use super::model::Product;
use crate::error::Result;

/// Supplier of the product collection.
///
/// The collection is fetched whole, with no pagination or server-side
/// filtering; every query runs client-side over the returned products.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Fetches the full product collection.
    ///
    /// # Errors
    ///
    /// `DataLoadFailed` when the collection cannot be retrieved or decoded.
    async fn fetch_products(&self) -> Result<Vec<Product>>;

    /// Short description of where products come from, for logs.
    fn describe(&self) -> String;
}
