//! Forgeline CLI - Database migrations and image pipeline management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! forgeline-cli migrate
//!
//! # List images still waiting on (or failed by) the derivative pipeline
//! forgeline-cli images pending
//!
//! # Re-run the derivative pipeline for one image
//! forgeline-cli images reprocess 6a3cbe3e-6f64-4bf9-9c5e-2f9b63bc2405
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `images pending` - List unprocessed or failed images
//! - `images reprocess` - Run the derivative pipeline for an image

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "forgeline-cli")]
#[command(author, version, about = "Forgeline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Manage the image derivative pipeline
    Images {
        #[command(subcommand)]
        action: ImagesAction,
    },
}

#[derive(Subcommand)]
enum ImagesAction {
    /// List images whose pipeline run is pending or failed
    Pending,
    /// Run the derivative pipeline for one image
    Reprocess {
        /// Image id (UUID) to process
        image_id: String,
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
        Commands::Images { action } => match action {
            ImagesAction::Pending => commands::images::pending().await?,
            ImagesAction::Reprocess { image_id } => {
                commands::images::reprocess(&image_id).await?;
            }
        },
    }
    Ok(())
}
