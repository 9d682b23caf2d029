//! Catalog Query Engine.
//!
//! Pure functions from a product collection (plus the user's search term and
//! category facet) to the views the catalog and home pages render. Nothing
//! here fails or performs I/O.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::Product;

/// Category facet value that matches every product.
pub const ALL_CATEGORIES: &str = "All";

/// Number of products in the home page's top-rated section.
pub const TOP_RATED_COUNT: usize = 6;

/// Plant promoted as the home page's featured product.
pub const FEATURED_PLANT_ID: u32 = 3;

/// Search term and category facet chosen on the catalog page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default)]
    pub search_term: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    ALL_CATEGORIES.to_string()
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            category: default_category(),
        }
    }
}

impl CatalogQuery {
    pub fn new(search_term: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            search_term: search_term.into(),
            category: category.into(),
        }
    }

    /// Returns true if `product` passes both the category facet and the search.
    pub fn matches(&self, product: &Product) -> bool {
        let in_category = self.category == ALL_CATEGORIES || product.category == self.category;
        in_category && matches_search(product, &self.search_term.to_lowercase())
    }
}

fn matches_search(product: &Product, needle_lower: &str) -> bool {
    needle_lower.is_empty()
        || product.plant_name.to_lowercase().contains(needle_lower)
        || product.description.to_lowercase().contains(needle_lower)
}

/// Products matching `category` (or any, for `"All"`) whose name or
/// description contains `search_term`, ignoring case. Collection order is kept.
pub fn filter<'a>(products: &'a [Product], search_term: &str, category: &str) -> Vec<&'a Product> {
    let query = CatalogQuery::new(search_term, category);
    products.iter().filter(|p| query.matches(p)).collect()
}

/// `"All"` followed by every distinct category, in first-seen order.
pub fn distinct_categories(products: &[Product]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for product in products {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

/// The `n` highest-rated products, best first.
///
/// Equal ratings keep their collection order and products without a rating
/// come last. Fewer than `n` products yields all of them.
pub fn top_rated(products: &[Product], n: usize) -> Vec<&Product> {
    let mut ranked: Vec<&Product> = products.iter().collect();
    // sort_by is stable, so ties keep collection order
    ranked.sort_by(|a, b| compare_rating_desc(a.rating, b.rating));
    ranked.truncate(n);
    ranked
}

fn compare_rating_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// First product whose `plant_id` is `id`.
pub fn find_featured(products: &[Product], id: u32) -> Option<&Product> {
    products.iter().find(|p| p.plant_id == id)
}

/// Looks up a product from the `:id` segment of a `/plants/:id` path.
///
/// Anything that is not a plant id finds nothing.
pub fn find_by_path_id<'a>(products: &'a [Product], raw_id: &str) -> Option<&'a Product> {
    raw_id
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|id| find_featured(products, id))
}

/// The catalog page for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogView {
    pub filtered: Vec<Product>,
    /// Size of the whole collection ("Showing X of Y plants")
    pub total: usize,
    pub categories: Vec<String>,
}

impl CatalogView {
    pub fn build(products: &[Product], query: &CatalogQuery) -> Self {
        Self {
            filtered: filter(products, &query.search_term, &query.category)
                .into_iter()
                .cloned()
                .collect(),
            total: products.len(),
            categories: distinct_categories(products),
        }
    }

    pub fn summary(&self) -> String {
        format!("Showing {} of {} plants", self.filtered.len(), self.total)
    }
}

/// The home page's derived views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub top_rated: Vec<Product>,
    pub featured: Option<Product>,
}

impl HomeView {
    pub fn build(products: &[Product], top_rated_count: usize, featured_id: u32) -> Self {
        Self {
            top_rated: top_rated(products, top_rated_count)
                .into_iter()
                .cloned()
                .collect(),
            featured: find_featured(products, featured_id).cloned(),
        }
    }
}
