//! Atelier operator CLI.
//!
//! # Usage
//!
//! ```bash
//! # Apply the Postgres schema
//! atelier-cli migrate
//!
//! # Insert catalog products from a JSON file
//! atelier-cli seed products.json
//!
//! # Create or promote an administrator
//! atelier-cli grant-admin <uid> --email owner@example.com --name "Shop Owner"
//! ```
//!
//! Every command needs `DATABASE_URL`.

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "atelier-cli")]
#[command(author, version, about = "Atelier operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the document store schema
    Migrate,
    /// Insert products from a JSON file (existing SKUs are skipped)
    Seed {
        /// Path to a JSON array of products
        file: String,
    },
    /// Create or update an approved administrator account
    GrantAdmin {
        /// Identity provider user id
        uid: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long, default_value = "Administrator")]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    atelier_observability::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let store = commands::connect().await?;
    match cli.command {
        Commands::Migrate => commands::migrate::run(&store).await?,
        Commands::Seed { file } => commands::seed::run(store, &file).await?,
        Commands::GrantAdmin { uid, email, name } => {
            commands::admin::grant(store, &uid, &email, &name).await?;
        }
    }
    Ok(())
}
