//! Product domain model and tolerant decoding of the product feed.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{GreenNestError, Result};

/// A plant offered in the catalog.
///
/// Field names on the wire are the camelCase names of the product feed.
/// Numeric attributes other than `plant_id` are optional: a missing or
/// unparseable value is `None` and ranks below every present value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "de_plant_id")]
    pub plant_id: u32,
    #[serde(default)]
    pub plant_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub care_level: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub price: Option<f64>,
    /// 0 to 5
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_u32")]
    pub available_stock: Option<u32>,
    #[serde(default)]
    pub provider_name: String,
    /// Image URL
    #[serde(default)]
    pub image: String,
}

impl Product {
    pub fn in_stock(&self) -> bool {
        self.available_stock.is_some_and(|stock| stock > 0)
    }
}

/// Decodes a product feed: a JSON array of product records.
///
/// Records that cannot be read as a [`Product`] (no usable `plantId`, wrong
/// shape) are skipped with a warning, as are later records repeating an
/// earlier `plantId`.
///
/// # Errors
///
/// `DataLoadFailed` when the document is not a JSON array.
pub fn decode_products(document: Value) -> Result<Vec<Product>> {
    let Value::Array(records) = document else {
        return Err(GreenNestError::data_load(
            "product feed is not a JSON array",
        ));
    };

    let mut products: Vec<Product> = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Product>(record) {
            Ok(product) if products.iter().any(|p| p.plant_id == product.plant_id) => {
                warn!(index, plant_id = product.plant_id, "Skipping duplicate plantId");
            }
            Ok(product) => products.push(product),
            Err(e) => warn!(index, error = %e, "Skipping malformed product record"),
        }
    }
    Ok(products)
}

/// Decodes a product feed from raw JSON text.
///
/// # Errors
///
/// `DataLoadFailed` when the text is not JSON or not an array.
pub fn decode_products_str(text: &str) -> Result<Vec<Product>> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| GreenNestError::data_load(format!("invalid product JSON: {e}")))?;
    decode_products(document)
}

fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn whole_u32(n: f64) -> Option<u32> {
    (n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX)).then_some(n as u32)
}

fn de_lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of))
}

fn de_lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_of).and_then(whole_u32))
}

fn de_plant_id<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    number_of(&value)
        .and_then(whole_u32)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid plantId: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_full_record() {
        let products = decode_products(json!([{
            "plantId": 3,
            "plantName": "Snake Plant",
            "description": "Hardy and upright.",
            "category": "Air Purifier",
            "careLevel": "Easy",
            "price": 25.5,
            "rating": 4.8,
            "availableStock": 12,
            "providerName": "UrbanLeaf",
            "image": "https://img.test/snake.jpg"
        }]))
        .unwrap();

        let plant = &products[0];
        assert_eq!(plant.plant_id, 3);
        assert_eq!(plant.care_level, "Easy");
        assert_eq!(plant.rating, Some(4.8));
        assert_eq!(plant.available_stock, Some(12));
        assert!(plant.in_stock());
    }

    #[test]
    fn test_missing_and_malformed_numbers_become_none() {
        let products = decode_products(json!([
            { "plantId": 1, "plantName": "Fern" },
            { "plantId": "2", "rating": "high", "price": "19.99", "availableStock": -3 }
        ]))
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].rating, None);
        assert_eq!(products[1].plant_id, 2);
        assert_eq!(products[1].rating, None);
        assert_eq!(products[1].price, Some(19.99));
        assert_eq!(products[1].available_stock, None);
        assert!(!products[1].in_stock());
    }

    #[test]
    fn test_skips_records_without_id_and_duplicates() {
        let products = decode_products(json!([
            { "plantName": "No id" },
            { "plantId": 1, "plantName": "First" },
            "not an object",
            { "plantId": 1, "plantName": "Again" }
        ]))
        .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].plant_name, "First");
    }

    #[test]
    fn test_rejects_non_array_document() {
        let err = decode_products(json!({ "plants": [] })).unwrap_err();
        assert!(err.is_data_load_failure());

        let err = decode_products_str("<html>").unwrap_err();
        assert!(err.is_data_load_failure());
    }
}
