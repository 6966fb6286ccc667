//! Binary crate for the `dashboard` tool.
//!
//! This crate focuses on:
//! - Serving the location, weather and quote endpoints
//! - Parsing CLI arguments and interactive configuration
//! - Human-friendly dashboard output

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod render;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    let default_level = if cmd.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    cmd.run().await
}
