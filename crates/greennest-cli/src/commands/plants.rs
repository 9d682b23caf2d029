use anyhow::Result;
use colored::Colorize;
use greennest_application::CatalogUseCase;
use greennest_core::catalog::CatalogQuery;

use super::utils::{Output, load_error, product_line};

pub async fn list(
    catalog: &CatalogUseCase,
    output: &Output,
    search: &str,
    category: &str,
) -> Result<()> {
    let view = catalog
        .catalog_page(&CatalogQuery::new(search, category))
        .await
        .map_err(load_error)?;

    if output.is_json() {
        return output.print_json(&view);
    }

    println!("{}", view.summary().dimmed());
    if view.filtered.is_empty() {
        println!("No plants found matching your criteria.");
        return Ok(());
    }
    for product in &view.filtered {
        println!("{}", product_line(product));
    }
    Ok(())
}

pub async fn categories(catalog: &CatalogUseCase, output: &Output) -> Result<()> {
    let view = catalog
        .catalog_page(&CatalogQuery::default())
        .await
        .map_err(load_error)?;

    if output.is_json() {
        return output.print_json(&view.categories);
    }
    for category in &view.categories {
        println!("{category}");
    }
    Ok(())
}

pub async fn detail(catalog: &CatalogUseCase, output: &Output, id: &str) -> Result<()> {
    let Some(product) = catalog.plant_detail(id).await.map_err(load_error)? else {
        anyhow::bail!("Plant not found: {id}");
    };

    if output.is_json() {
        return output.print_json(&product);
    }

    println!("{}", product.plant_name.bold().green());
    println!("{}", product.description);
    println!();
    println!("Category:    {}", product.category);
    println!("Care level:  {}", product.care_level);
    if let Some(price) = product.price {
        println!("Price:       ${price:.2}");
    }
    if let Some(rating) = product.rating {
        println!("Rating:      {rating:.1}");
    }
    let stock = if product.in_stock() {
        format!("{} in stock", product.available_stock.unwrap_or_default()).green()
    } else {
        "Out of stock".red()
    };
    println!("Stock:       {stock}");
    println!("Provider:    {}", product.provider_name);
    Ok(())
}
