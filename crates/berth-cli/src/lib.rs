//! # berth-cli
//!
//! The `berth` binary: `berth check` audits the local engine host
//! against a profile; `berth serve` runs the fleet aggregation server.

pub mod args;
pub mod commands;
pub mod profile_source;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Cli, Commands};

/// Parse arguments and dispatch.
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => commands::check::execute(args).await,
        Commands::Serve(args) => commands::serve::execute(args).await,
    }
}
