//! StoreChat CLI - database migrations and seed data.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations
//! storechat migrate
//!
//! # Insert the built-in sample catalogue
//! storechat seed products
//!
//! # Load products from a CSV file
//! storechat seed products --file data/products.csv
//!
//! # Create the demo users
//! storechat seed users
//! ```
//!
//! # Environment Variables
//!
//! - `STORECHAT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod catalogue;
mod commands;

#[derive(Parser)]
#[command(name = "storechat")]
#[command(author, version, about = "StoreChat CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert products from a CSV file, or the sample catalogue
    Products {
        /// CSV with columns name,description,price,category,brand,in_stock
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Create the demo users if they don't exist
    Users,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Products { file } => commands::seed::products(file.as_deref()).await?,
            SeedTarget::Users => commands::seed::users().await?,
        },
    }
    Ok(())
}
