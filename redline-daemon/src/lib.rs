//! Redline daemon library.
//!
//! This library provides:
//! - Configuration loading (`redline.toml`)
//! - HTTP client for the external batch classifier
//! - The axum router serving the comparison API

pub mod classifier_client;
pub mod config;
pub mod server;

use anyhow::{Context, Result};
use redline_core::ChangeClassifier;
use std::sync::Arc;
use tracing::{info, warn};

use classifier_client::HttpBatchClassifier;
use config::{ClassifierSettings, RedlineConfig};
use server::{create_router, AppState};

/// Build the classifier described by `settings`.
///
/// A configured endpoint with unusable credentials is logged and ignored; the
/// daemon then serves heuristic labels only.
pub fn build_classifier(settings: &ClassifierSettings) -> ChangeClassifier {
    match HttpBatchClassifier::from_settings(settings) {
        Ok(Some(client)) => {
            info!("External classifier: {}", client.endpoint());
            ChangeClassifier::with_external(Arc::new(client), settings.policy())
        }
        Ok(None) => ChangeClassifier::local(),
        Err(e) => {
            warn!("External classifier disabled: {}", e);
            ChangeClassifier::local()
        }
    }
}

/// Application state for `config`.
pub fn build_state(config: &RedlineConfig) -> AppState {
    AppState::new(
        build_classifier(&config.classifier),
        config.limits.clone(),
    )
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: RedlineConfig) -> Result<()> {
    let router = create_router(build_state(&config));
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Redline daemon listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Redline daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
