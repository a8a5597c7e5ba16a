//! marketsync
//!
//! Command-line front end for the marketplace wallet and profile screens.

mod commands;
mod config;
mod shutdown;

use clap::Parser;
use commands::Command;
use config::ConfigLoader;
use marketsync_sdk::cancel::cancellation;
use shutdown::spawn_interrupt_handler;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Marketplace wallet and profile client
#[derive(Parser, Debug)]
#[command(name = "marketsync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./marketsync.toml")]
    config: PathBuf,

    /// Override the primary backend base URL
    #[arg(long)]
    primary: Option<String>,

    /// Override the per-attempt timeout, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Bearer token for the session
    #[arg(long, env = "MARKETSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::debug!("Starting marketsync v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let loaded_config = ConfigLoader::new(&args.config)
        .with_primary(args.primary)
        .with_timeout_secs(args.timeout_secs)
        .with_token(args.token)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;

    // Ctrl+C rolls back whatever edit is in flight
    let (cancel_handle, cancel) = cancellation();
    let interrupt_task = spawn_interrupt_handler(cancel_handle);

    let result = commands::run(args.command, loaded_config, cancel).await;
    interrupt_task.abort();

    result.map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
