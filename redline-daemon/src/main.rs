//! Redline daemon - HTTP document comparison service.
//!
//! A single binary that serves:
//! - `POST /compare` for normalized, sectioned diffs
//! - `POST /categorize` for materiality labels
//! - `POST /extract` for DOCX / text extraction with list numbering

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use redline_daemon::config::RedlineConfig;

/// Redline document comparison daemon
#[derive(Parser, Debug)]
#[command(name = "redline-daemon")]
#[command(about = "HTTP service for deterministic document comparison")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./redline.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// HTTP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    let mut config = match &cli.config {
        Some(path) => RedlineConfig::from_file(path)?,
        None => RedlineConfig::load(&std::env::current_dir()?),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    info!("Starting redline daemon");
    redline_daemon::serve(config).await
}
