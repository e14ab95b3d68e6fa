//! Normalize command - show a document's canonical text

use std::path::Path;

use anyhow::Result;
use redline_core::normalize;
use serde::Serialize;

use super::read_document;
use crate::output::{Output, OutputConfig, TableDisplay};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub path: String,
    /// Whether any character was rewritten
    pub changed: bool,
    pub text: String,
}

impl TableDisplay for NormalizeReport {
    fn to_table(&self) -> String {
        self.text.clone()
    }
}

/// Run the normalize command
pub async fn run(path: &Path, output: OutputConfig) -> Result<()> {
    let raw = read_document(path, None)?;
    let text = normalize(&raw).into_string();

    let report = NormalizeReport {
        path: path.display().to_string(),
        changed: text != raw,
        text,
    };
    Output::with_config(report, output).render()
}
