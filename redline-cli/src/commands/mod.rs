//! Command implementations for the redline CLI.

pub mod categorize;
pub mod compare;
pub mod extract;
pub mod normalize;
pub mod serve;

use anyhow::{Context, Result};
use redline_core::{extract_text, ChangeClassifier, DocumentFormat, RedlineError};
use redline_daemon::classifier_client::HttpBatchClassifier;
use redline_daemon::config::RedlineConfig;
use std::path::Path;
use std::sync::Arc;

/// Read `path` and extract its text.
///
/// The format is `declared` when given, otherwise guessed from the extension.
pub fn read_document(path: &Path, declared: Option<DocumentFormat>) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let format = declared.unwrap_or_else(|| DocumentFormat::from_path(path));
    extract_text(&bytes, format)
        .with_context(|| format!("failed to extract text from {}", path.display()))
}

/// Reject texts longer than the configured comparison bound.
pub fn check_length(text: &str, config: &RedlineConfig) -> Result<(), RedlineError> {
    let length = text.chars().count();
    let max_length = config.limits.max_input_chars;
    if length > max_length {
        return Err(RedlineError::InputTooLarge { length, max_length });
    }
    Ok(())
}

/// Classifier for a command run.
///
/// `remote` requires a configured endpoint with usable credentials; unlike the
/// daemon, the CLI fails instead of silently degrading to heuristics.
pub fn classifier(remote: bool, config: &RedlineConfig) -> Result<ChangeClassifier> {
    if !remote {
        return Ok(ChangeClassifier::local());
    }
    let client = HttpBatchClassifier::from_settings(&config.classifier)?
        .context("--remote requires a [classifier] endpoint in redline.toml")?;
    tracing::debug!(endpoint = client.endpoint(), "using external classifier");
    Ok(ChangeClassifier::with_external(
        Arc::new(client),
        config.classifier.policy(),
    ))
}
