//! Categorize command - label existing diff ops by materiality
//!
//! Reads a JSON file holding either a bare array of ops or an object with a
//! `changes` array, the same shape `/categorize` accepts.

use std::path::Path;

use anyhow::{Context, Result};
use redline_core::{ClassifiedChange, DiffOp};
use redline_daemon::config::RedlineConfig;
use serde::{Deserialize, Serialize};

use super::classifier;
use crate::output::{truncate, Output, OutputConfig, Outputter, TableOutput};

const TEXT_WIDTH: usize = 40;

#[derive(Deserialize)]
#[serde(untagged)]
enum ChangesFile {
    List(Vec<DiffOp>),
    Wrapped { changes: Vec<DiffOp> },
}

impl ChangesFile {
    fn into_ops(self) -> Vec<DiffOp> {
        match self {
            ChangesFile::List(ops) | ChangesFile::Wrapped { changes: ops } => ops,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeReport {
    pub categorized_changes: Vec<ClassifiedChange>,
}

impl Outputter for CategorizeReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .categorized_changes
            .iter()
            .filter(|c| c.op.is_change())
            .map(|c| {
                let text = format!("{:?}", c.op.text);
                let text = if config.should_truncate() {
                    truncate(&text, TEXT_WIDTH)
                } else {
                    text
                };
                vec![
                    c.op.id.to_string(),
                    c.op.kind.as_str().to_string(),
                    c.category.map(|k| k.to_string()).unwrap_or_default(),
                    c.classified_by
                        .map(|s| format!("{:?}", s).to_lowercase())
                        .unwrap_or_default(),
                    text,
                    c.explanation.clone().unwrap_or_default(),
                ]
            })
            .collect();

        TableOutput::from_rows(
            &["ID", "KIND", "CATEGORY", "SOURCE", "TEXT", "EXPLANATION"],
            &rows,
            config,
        )
    }
}

fn parse_changes(content: &str) -> Result<Vec<DiffOp>> {
    let file: ChangesFile = serde_json::from_str(content)
        .context("expected a JSON array of ops or an object with a \"changes\" array")?;
    Ok(file.into_ops())
}

/// Run the categorize command
pub async fn run(
    path: &Path,
    remote: bool,
    config: &RedlineConfig,
    output: OutputConfig,
) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let ops = parse_changes(&content)?;

    let classifier = classifier(remote, config)?;
    tracing::debug!(
        ops = ops.len(),
        strategy = ?classifier.strategy_for(ops.iter().filter(|op| op.is_change()).count()),
        "categorizing"
    );
    let categorized_changes = classifier.classify(&ops).await;

    Output::with_config(CategorizeReport { categorized_changes }, output).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use redline_core::{ChangeClassifier, OpKind};

    #[test]
    fn test_parse_both_shapes() {
        let bare = r#"[{"id": 1, "kind": "insert", "text": "shall"}]"#;
        let wrapped = r#"{"changes": [{"id": 1, "kind": "insert", "text": "shall"}]}"#;

        let ops = parse_changes(bare).unwrap();
        assert_eq!(ops, parse_changes(wrapped).unwrap());
        assert_eq!(ops[0].kind, OpKind::Insert);
    }

    #[test]
    fn test_parse_rejects_other_json() {
        assert!(parse_changes(r#"{"ops": []}"#).is_err());
        assert!(parse_changes("not json").is_err());
    }

    #[test]
    fn test_table_skips_equal_ops() {
        let ops = vec![
            DiffOp::new(0, OpKind::Equal, "The fee is $"),
            DiffOp::new(1, OpKind::Delete, "1"),
        ];
        let report = CategorizeReport {
            categorized_changes: ChangeClassifier::local().classify_local(&ops),
        };
        let config = OutputConfig::new(OutputFormat::Table).without_truncation();
        let table = report.to_table(&config);

        assert!(table.contains("substantive"));
        assert!(table.contains("heuristic"));
        assert!(!table.contains("The fee is"));
    }
}
