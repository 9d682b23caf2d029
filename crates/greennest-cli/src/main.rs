use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use greennest_application::CatalogUseCase;
use greennest_infrastructure::{ConfigService, product_source_from_config};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "greennest")]
#[command(about = "GreenNest CLI - browse the plant catalog", long_about = None)]
struct Cli {
    /// Product feed URL or JSON file path (overrides the config file)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Log filter directive, e.g. "info" or "greennest_core=debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List plants, optionally filtered
    Plants {
        /// Case-insensitive search over plant names and descriptions
        #[arg(long, default_value = "")]
        search: String,
        /// Category to keep ("All" keeps every category)
        #[arg(long, default_value = "All")]
        category: String,
    },
    /// List the categories offered by the catalog
    Categories,
    /// Show the top-rated plants and the featured plant
    Home,
    /// Show one plant
    Plant {
        /// Plant id as it appears in /plants/:id
        id: String,
    },
}

fn initialize_tracing(directive: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_service = ConfigService::new().context("Failed to locate config directory")?;
    let mut config = config_service.get_config();
    if let Some(source) = cli.source {
        config.catalog.source = source;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    initialize_tracing(&config.logging.level);
    tracing::debug!(path = %config_service.path().display(), source = %config.catalog.source, "Configuration resolved");

    let source = product_source_from_config(&config.catalog)?;
    let catalog = CatalogUseCase::with_config(source, &config.catalog);
    let output = commands::utils::Output::new(cli.json);

    match cli.command {
        Commands::Plants { search, category } => {
            commands::plants::list(&catalog, &output, &search, &category).await?
        }
        Commands::Categories => commands::plants::categories(&catalog, &output).await?,
        Commands::Home => commands::home::show(&catalog, &output).await?,
        Commands::Plant { id } => commands::plants::detail(&catalog, &output, &id).await?,
    }

    Ok(())
}
