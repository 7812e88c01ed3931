//! Binary crate for the `city-hub` command-line tool.
//!
//! This crate focuses on:
//! - Loading `.env` and installing logging
//! - Parsing CLI arguments
//! - Interactive configuration and the Weather/News tabs
//! - Serving the lookups as MCP tools

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod mcp;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the environment may already be populated.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
