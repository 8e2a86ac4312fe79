//! La Matera CLI - Catalog seeding and diagnostics.
//!
//! # Usage
//!
//! ```bash
//! # Insert the launch catalog (skips rows that already exist)
//! la-matera-cli seed
//!
//! # Verify backend connectivity and configuration
//! la-matera-cli check
//! ```
//!
//! # Commands
//!
//! - `seed` - Insert the launch categories and products
//! - `check` - Verify backend connectivity and configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "la-matera-cli")]
#[command(author, version, about = "La Matera CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the launch catalog (idempotent)
    Seed,
    /// Verify backend connectivity and configuration
    Check,
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Check => commands::check::run().await?,
    }
    Ok(())
}
