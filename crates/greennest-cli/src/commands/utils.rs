use anyhow::Result;
use colored::Colorize;
use greennest_core::catalog::Product;
use greennest_core::error::GreenNestError;
use serde::Serialize;

/// Renders command results as text or JSON.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// One catalog card line: name, category, rating and price.
pub fn product_line(product: &Product) -> String {
    let rating = product
        .rating
        .map(|r| format!("{r:.1}"))
        .unwrap_or_else(|| "-".to_string());
    let price = product
        .price
        .map(|p| format!("${p:.2}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>4}  {}  {}  ★ {}  {}",
        product.plant_id,
        product.plant_name.bold(),
        product.category.dimmed(),
        rating.yellow(),
        price.green()
    )
}

/// Turns a load failure into the message the catalog page shows.
pub fn load_error(err: GreenNestError) -> anyhow::Error {
    anyhow::anyhow!("{} ({err})", err.user_message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_line_marks_missing_values() {
        colored::control::set_override(false);
        let product = Product {
            plant_id: 9,
            plant_name: "Echeveria".to_string(),
            description: String::new(),
            category: "Succulent".to_string(),
            care_level: "Easy".to_string(),
            price: Some(8.0),
            rating: None,
            available_stock: Some(40),
            provider_name: String::new(),
            image: String::new(),
        };

        assert_eq!(product_line(&product), "   9  Echeveria  Succulent  ★ -  $8.00");
    }

    #[test]
    fn test_load_error_carries_page_message() {
        let err = load_error(GreenNestError::data_load("HTTP 503"));
        assert!(err.to_string().starts_with("Could not load plants."));
    }
}
