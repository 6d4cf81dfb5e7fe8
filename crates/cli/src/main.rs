//! Lensway CLI - operational tooling.
//!
//! # Usage
//!
//! ```bash
//! # Seed prescription lens types (token from flag or LENSWAY_ADMIN_TOKEN)
//! lw-cli seed lens-types --token "$TOKEN"
//!
//! # Against a specific backend
//! lw-cli seed lens-types --api-url http://localhost:5000/api
//! ```
//!
//! # Commands
//!
//! - `seed lens-types` - Create the fixed prescription lens types if absent

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "lw-cli")]
#[command(author, version, about = "Lensway CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed backend reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Create the fixed prescription lens types (and progressive variants)
    LensTypes {
        /// Admin bearer token
        #[arg(long, env = "LENSWAY_ADMIN_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Backend base URL
        #[arg(long, env = "LENSWAY_API_URL")]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env fallbacks
    dotenvy::dotenv().ok();

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
        Commands::Seed { target } => match target {
            SeedTarget::LensTypes { token, api_url } => {
                let token = token.filter(|t| !t.trim().is_empty()).map(SecretString::from);
                commands::seed::run_lens_types(token, api_url.as_deref()).await?;
            }
        },
    }
    Ok(())
}
