use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vorrat::cli::{self, pantry::NewStock};

/// vorrat - pantry allocation and shopping lists for planned meals
#[derive(Parser)]
#[command(name = "vorrat")]
#[command(about = "Reconciles a meal plan with the pantry and builds shopping lists")]
#[command(long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Show which ingredients of a plan the pantry covers
    Allocate {
        #[arg(long)]
        owner: String,
        /// JSON plan with `entries` and `recipes`
        #[arg(long)]
        plan: PathBuf,
    },
    /// Build the shopping list for a plan
    ShoppingList {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        plan: PathBuf,
    },
    /// Mark one planned meal as cooked and take its ingredients out of the pantry
    Cook {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        plan: PathBuf,
        /// Id of the planned entry
        #[arg(long)]
        entry: String,
    },
    /// How many packages of a product cover a need
    PackageQuantity {
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        unit: String,
        /// Product label or size text, e.g. "Zwiebeln Duo 150g"
        #[arg(long)]
        package: String,
    },
    /// Cheapest product out of catalog search results
    Offer {
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        unit: String,
        /// JSON array of products
        #[arg(long)]
        products: PathBuf,
    },
    /// List pantry stock
    Pantry {
        #[arg(long)]
        owner: String,
    },
    /// Put a new row into the pantry
    Add {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        unit: String,
        /// Always in stock, never decremented
        #[arg(long)]
        permanent: bool,
        #[arg(long)]
        category: Option<String>,
        /// Unix timestamp in seconds
        #[arg(long)]
        expiry: Option<u64>,
    },
    /// Book a purchase back into the pantry
    Restock {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        unit: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        expiry: Option<u64>,
    },
    /// Make `alias` resolve to `canonical`
    Alias {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        canonical: String,
        #[arg(long)]
        alias: String,
    },
    /// Remove an alias
    Unalias {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        alias: String,
    },
    /// Never allocate or buy an ingredient
    Block {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
    },
    /// Remove an ingredient from the block list
    Unblock {
        #[arg(long)]
        owner: String,
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = vorrat::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    vorrat::observability::init_observability(
        "vorrat",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Migrate => migrate_command(config).await,
        Commands::Allocate { owner, plan } => cli::plan::allocate(config, &owner, &plan).await,
        Commands::ShoppingList { owner, plan } => {
            cli::plan::shopping_list(config, &owner, &plan).await
        }
        Commands::Cook { owner, plan, entry } => {
            cli::plan::cook(config, &owner, &plan, &entry).await
        }
        Commands::PackageQuantity {
            amount,
            unit,
            package,
        } => cli::package::quantity(amount, &unit, &package),
        Commands::Offer {
            amount,
            unit,
            products,
        } => cli::package::offer(amount, &unit, &products),
        Commands::Pantry { owner } => cli::pantry::list(config, &owner).await,
        Commands::Add {
            owner,
            name,
            amount,
            unit,
            permanent,
            category,
            expiry,
        } => {
            let stock = NewStock {
                name,
                amount,
                unit,
                category,
                expiry_date: expiry,
            };
            cli::pantry::add(config, &owner, stock, permanent).await
        }
        Commands::Restock {
            owner,
            name,
            amount,
            unit,
            category,
            expiry,
        } => {
            let stock = NewStock {
                name,
                amount,
                unit,
                category,
                expiry_date: expiry,
            };
            cli::pantry::restock(config, &owner, stock).await
        }
        Commands::Alias {
            owner,
            canonical,
            alias,
        } => cli::pantry::alias(config, &owner, canonical, alias).await,
        Commands::Unalias { owner, alias } => cli::pantry::unalias(config, &owner, &alias).await,
        Commands::Block { owner, name } => cli::pantry::block(config, &owner, name).await,
        Commands::Unblock { owner, name } => cli::pantry::unblock(config, &owner, &name).await,
    }
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: vorrat::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    let pool = vorrat::create_pool(&config.database.url, 1).await?;
    vorrat::db::migrate(&pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}
