//! Rewind host
//!
//! Runs the recorder behind a JSON-lines bridge: host events are read from
//! stdin, observer broadcasts and agent relays are written to stdout.

mod bridge;
mod wire;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rewind_core::Config;

#[derive(Debug, Parser)]
#[command(name = "rewind", version, about = "Time-travel debugger state core")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the config file (RUST_LOG still wins)
    #[arg(long)]
    log_filter: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load_or_default().context("failed to load default config")?,
    };

    rewind_core::init_logging(cli.log_filter.as_deref().unwrap_or(&config.log_filter));

    bridge::run(config).await
}
