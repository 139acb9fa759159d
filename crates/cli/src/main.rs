//! Leadlight CLI - Schema setup and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the database schema (idempotent)
//! ll-cli migrate
//!
//! # Create an admin user
//! ll-cli admin create -e admin@example.com -n "Ana Admin" -p <password>
//!
//! # Grant or revoke the admin flag on an existing user
//! ll-cli admin promote -e user@example.com
//! ll-cli admin demote -e user@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create all application tables if they do not exist
//! - `admin create` - Create an admin user
//! - `admin promote` / `admin demote` - Toggle the admin flag on a user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ll-cli")]
#[command(author, version, about = "Leadlight CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema (idempotent)
    Migrate,
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// Grant the admin flag to an existing user
    Promote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin flag from an existing user
    Demote {
        /// User email address
        #[arg(short, long)]
        email: String,
    },
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
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                name,
                password,
            } => {
                commands::admin::create_user(&email, &name, &password).await?;
            }
            AdminAction::Promote { email } => {
                commands::admin::set_admin_flag(&email, true).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_admin_flag(&email, false).await?;
            }
        },
    }
    Ok(())
}
