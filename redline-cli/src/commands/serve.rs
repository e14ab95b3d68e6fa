//! Serve command - run the HTTP comparison service in the foreground

use anyhow::Result;
use colored::Colorize;
use redline_daemon::config::RedlineConfig;

/// Run the serve command
pub async fn run(mut config: RedlineConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    eprintln!(
        "{} http://{} (Ctrl-C to stop)",
        "Serving redline API on".green().bold(),
        config.bind_address()
    );
    redline_daemon::serve(config).await
}
