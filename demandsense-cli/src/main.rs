//! Binary crate for the `demandsense` command-line dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and the sidebar prompts
//! - Human-friendly and JSON output formatting

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod cli;
mod interactive;
mod render;

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,demandsense=debug,demandsense_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Secrets may come from a local .env file.
    let _ = dotenvy::dotenv();

    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}
