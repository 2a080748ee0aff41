mod catalog;
mod import;
mod templates;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tienda-cli")]
#[command(about = "Hardware marketplace command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Load the demo catalog into the local store
    Seed {
        /// Rewrite demo products even when the stored version matches
        #[arg(long)]
        force: bool,
    },
    /// List offer groups ranked by distance
    Offers {
        /// User latitude (requires --lng)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// User longitude (requires --lat)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Maximum number of groups to print
        #[arg(long)]
        limit: Option<usize>,
        /// Only include listings matching this text
        #[arg(long)]
        query: Option<String>,
    },
    /// Compare one listing against every seller offering the same product
    Compare {
        /// Product listing id
        product_id: u64,
    },
    /// List sellers, nearest first
    Sellers,
    /// Ask the shopping assistant a question
    Chat {
        /// The question, e.g. "taladro"
        message: String,
    },
    /// Load a filled-in spreadsheet template into a seller's inventory
    Import {
        /// Seller id that will own the imported listings
        #[arg(long)]
        seller: String,
        /// The .xlsx workbook; only its first sheet is read
        file: PathBuf,
        /// Replace the seller's inventory instead of adding to it
        #[arg(long)]
        replace: bool,
    },
    /// Write the spreadsheet templates sellers fill in for bulk upload
    Templates {
        /// Directory the .xlsx files are written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => println!("tienda-cli ready; run with --help to list commands"),
        // Templates need no configuration or store.
        Some(Commands::Templates { out_dir }) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();
            run_templates(&out_dir)?;
        }
        Some(command) => run_with_store(command).await?,
    }

    Ok(())
}

async fn run_with_store(command: Commands) -> anyhow::Result<()> {
    let config = tienda_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = tienda_store::CatalogStore::open(&config.data_dir)?;

    match command {
        Commands::Seed { force } => catalog::run_seed(&store, &config, force),
        Commands::Offers {
            lat,
            lng,
            limit,
            query,
        } => catalog::run_offers(&store, &config, lat.zip(lng), limit, query.as_deref()),
        Commands::Compare { product_id } => catalog::run_compare(&store, &config, product_id),
        Commands::Sellers => catalog::run_sellers(&store, &config),
        Commands::Chat { message } => catalog::run_chat(&store, &config, &message).await,
        Commands::Import {
            seller,
            file,
            replace,
        } => {
            let imported = import::run_import(&store, &seller, &file, replace)?;
            println!("Imported {imported} products for {seller}");
            Ok(())
        }
        Commands::Templates { out_dir } => run_templates(&out_dir),
    }
}

fn run_templates(out_dir: &Path) -> anyhow::Result<()> {
    for path in templates::write_templates(out_dir)? {
        println!("created {}", path.display());
    }
    Ok(())
}
