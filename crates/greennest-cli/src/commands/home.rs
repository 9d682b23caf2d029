use anyhow::Result;
use colored::Colorize;
use greennest_application::CatalogUseCase;

use super::utils::{Output, load_error, product_line};

pub async fn show(catalog: &CatalogUseCase, output: &Output) -> Result<()> {
    let home = catalog.home_page().await.map_err(load_error)?;

    if output.is_json() {
        return output.print_json(&home);
    }

    println!("{}", "Top Rated Plants".bold());
    for product in &home.top_rated {
        println!("{}", product_line(product));
    }

    println!();
    println!("{}", "Plant of the Week".bold());
    match &home.featured {
        Some(product) => {
            println!("{}", product_line(product));
            println!("      {}", product.description);
        }
        None => println!("{}", "No featured plant this week.".dimmed()),
    }
    Ok(())
}
