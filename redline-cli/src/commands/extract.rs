//! Extract command - print the comparable text of a document

use std::path::Path;

use anyhow::Result;
use redline_core::DocumentFormat;
use serde::Serialize;

use super::read_document;
use crate::output::{Output, OutputConfig, TableDisplay};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReport {
    pub path: String,
    pub format: String,
    pub characters: usize,
    pub text: String,
}

impl TableDisplay for ExtractReport {
    fn to_table(&self) -> String {
        self.text.clone()
    }
}

/// Run the extract command
///
/// `declared` overrides the extension-based format guess.
pub async fn run(path: &Path, declared: Option<&str>, output: OutputConfig) -> Result<()> {
    let format = match declared {
        Some(name) => name.parse::<DocumentFormat>()?,
        None => DocumentFormat::from_path(path),
    };
    let text = read_document(path, Some(format))?;

    let report = ExtractReport {
        path: path.display().to_string(),
        format: format.to_string(),
        characters: text.chars().count(),
        text,
    };
    Output::with_config(report, output).render()
}
