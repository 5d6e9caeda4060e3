//! Logboard - Terminal dashboard for the log-analyzer server
//!
//! Usage:
//!   logboard dashboard <FILE_ID>    Open the dashboard for a log file
//!   logboard entry <ENTRY_ID>       Print one entry's detail record

mod cache;
mod charts;
mod client;
mod config;
mod fetcher;
mod filter;
mod fragment;
mod tui;

use anyhow::{Context, Result};
use cache::MemoryCache;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client::{DashboardClient, DetailSource};
use fetcher::DetailFetcher;
use filter::FilterState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "logboard")]
#[command(author = "Logboard Team")]
#[command(version)]
#[command(about = "Terminal dashboard for the log-analyzer server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the dashboard for a log file
    Dashboard {
        /// Log file to analyze
        file_id: u64,

        /// Server URL (overrides the configured one)
        #[arg(long)]
        server: Option<String>,

        /// Initial IP address filter (substring match)
        #[arg(long)]
        ip_address: Option<String>,

        /// Initial HTTP method filter
        #[arg(long)]
        method: Option<String>,

        /// Initial status code filter
        #[arg(long)]
        status_code: Option<u16>,

        /// Initial path filter (substring match)
        #[arg(long)]
        path: Option<String>,

        /// Initial start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Initial end date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Initial query parameter name filter
        #[arg(long)]
        query_param: Option<String>,

        /// Initial query parameter value filter
        #[arg(long)]
        query_value: Option<String>,
    },

    /// Fetch one log entry's detail record and print it as JSON
    Entry {
        /// Entry identifier
        entry_id: String,

        /// Server URL (overrides the configured one)
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},logboard_cli=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    // Ensure config directories exist
    config::ensure_dirs()?;

    let config = config::Config::load()?;

    match cli.command {
        Commands::Dashboard {
            file_id,
            server,
            ip_address,
            method,
            status_code,
            path,
            start_date,
            end_date,
            query_param,
            query_value,
        } => {
            let server_url = server.unwrap_or(config.server_url);
            let initial = FilterState {
                ip_address,
                method,
                status_code,
                path,
                start_date,
                end_date,
                query_param,
                query_value,
            };

            let client = DashboardClient::new(&server_url);
            let cache = Arc::new(MemoryCache::new());
            let fetcher = DetailFetcher::new(cache, Arc::new(client.clone()));

            tui::run(client, fetcher, file_id, initial).await
        }

        Commands::Entry { entry_id, server } => {
            let server_url = server.unwrap_or(config.server_url);
            let client = DashboardClient::new(&server_url);

            let record = client
                .fetch(&entry_id)
                .await
                .with_context(|| format!("Failed to fetch entry {}", entry_id))?;

            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
    }
}
