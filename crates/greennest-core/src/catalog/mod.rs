//! Catalog domain module.
//!
//! - `model`: `Product` and tolerant decoding of the product feed
//! - `query`: the Catalog Query Engine (filter, categories, top rated, featured)
//! - `source`: `ProductSource` trait implemented by infrastructure

pub mod model;
pub mod query;
pub mod source;

pub use model::{Product, decode_products, decode_products_str};
pub use query::{
    ALL_CATEGORIES, CatalogQuery, CatalogView, FEATURED_PLANT_ID, HomeView, TOP_RATED_COUNT,
    distinct_categories, filter, find_by_path_id, find_featured, top_rated,
};
pub use source::ProductSource;
