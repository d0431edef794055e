//! SinoCoffee CLI - database migrations, seed data and admin roles.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations
//! sc-cli migrate
//!
//! # Load the menu and coffee shops
//! sc-cli seed --menu crates/cli/seed/menu.yaml --shops crates/cli/seed/coffee_shops.yaml
//!
//! # Give a user access to the menu editor
//! sc-cli admin grant 7f1c7a52-2f0e-4c1e-9d3b-1f6e2b8c9a10
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sc-cli")]
#[command(author, version, about = "SinoCoffee CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert menu items and coffee shops from YAML files
    Seed {
        /// Menu items file
        #[arg(long)]
        menu: Option<PathBuf>,

        /// Coffee shops file
        #[arg(long)]
        shops: Option<PathBuf>,
    },
    /// Manage admin roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to an auth user
    Grant {
        /// Auth user UUID
        user_id: String,
    },
    /// Revoke the admin role
    Revoke {
        /// Auth user UUID
        user_id: String,
    },
    /// List users holding the admin role
    List,
}

#[tokio::main]
async fn main() {
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Seed { menu, shops } => {
            if menu.is_none() && shops.is_none() {
                return Err("nothing to seed: pass --menu and/or --shops".into());
            }
            if let Some(path) = menu {
                commands::seed::menu(&path).await?;
            }
            if let Some(path) = shops {
                commands::seed::coffee_shops(&path).await?;
            }
        }
        Commands::Admin { action } => match action {
            AdminAction::Grant { user_id } => commands::admin::grant(&user_id).await?,
            AdminAction::Revoke { user_id } => commands::admin::revoke(&user_id).await?,
            AdminAction::List => commands::admin::list().await?,
        },
    }
    Ok(())
}
