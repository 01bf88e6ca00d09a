//! Trading system engine CLI
//!
//! Loads the engine configuration, wires the inter-service client manager
//! and either serves the health and metrics endpoints or runs one
//! diagnostic command against the risk monitor and test coordinator.

mod args;
mod commands;
mod router;

use args::Cli;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    router::route(cli).await
}
