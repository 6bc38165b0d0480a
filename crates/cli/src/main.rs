//! # LapGap CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Session loading and validation
//! - Lap analysis and timestamp mapping
//! - A simulated two-stream sync run with graceful shutdown

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_analyze, run_map, run_simulate, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "lapgap starting");

    let result = match &cli.command {
        Commands::Analyze(args) => run_analyze(args),
        Commands::Map(args) => run_map(args),
        Commands::Simulate(args) => run_simulate(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(cli.observability_config())
}
