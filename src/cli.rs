use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "nepsewatch")]
#[command(about = "NEPSE stock price badge watcher", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the watcher daemon
    Watch {
        /// Paint the badge into this JSON file (status-bar custom-module
        /// format) instead of the terminal
        #[arg(long)]
        badge_file: Option<PathBuf>,
    },
    /// Set the tracked ticker symbol
    Set {
        /// Ticker symbol, e.g. NMIC or NABIL
        symbol: String,
    },
    /// Run one refresh cycle and exit
    Fetch,
    /// Show cached state without fetching
    Status,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch { badge_file } => {
            commands::watch::run(badge_file).await;
        }
        Commands::Set { symbol } => {
            commands::set_symbol::run(symbol).await;
        }
        Commands::Fetch => {
            commands::fetch::run().await;
        }
        Commands::Status => {
            commands::status::run().await;
        }
    }
}
