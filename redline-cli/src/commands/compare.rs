//! Compare command - redline between two document versions
//!
//! Both files are extracted, normalized and diffed; changes are printed under
//! the section header they fall in, optionally with materiality labels.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use redline_core::{compare, Category, ClassifiedChange, ComparisonResult, DiffOp, OpKind};
use redline_daemon::config::RedlineConfig;
use serde::Serialize;

use super::{check_length, classifier, read_document};
use crate::output::{Output, OutputConfig, Outputter, TableOutput};

/// Options for one compare run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareOptions {
    /// Attach materiality labels
    pub classify: bool,
    /// Use the configured external classifier
    pub remote: bool,
}

/// Comparison result plus the files it came from.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareReport {
    pub original: String,
    pub revised: String,
    #[serde(flatten)]
    pub result: ComparisonResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorized_changes: Option<Vec<ClassifiedChange>>,
    pub duration_ms: u64,
}

impl CompareReport {
    fn labels(&self) -> HashMap<u32, &ClassifiedChange> {
        self.categorized_changes
            .iter()
            .flatten()
            .filter(|c| c.category.is_some())
            .map(|c| (c.op.id, c))
            .collect()
    }

    fn category_counts(&self) -> Option<[(Category, usize); 3]> {
        let changes = self.categorized_changes.as_ref()?;
        let count = |category: Category| {
            changes
                .iter()
                .filter(|c| c.category == Some(category))
                .count()
        };
        Some([
            (Category::Substantive, count(Category::Substantive)),
            (Category::Minor, count(Category::Minor)),
            (Category::Formatting, count(Category::Formatting)),
        ])
    }
}

fn paint_category(category: Category) -> ColoredString {
    let label = format!("[{}]", category);
    match category {
        Category::Substantive => label.red().bold(),
        Category::Minor => label.yellow(),
        Category::Formatting => label.dimmed(),
    }
}

fn format_op(op: &DiffOp, label: Option<&ClassifiedChange>) -> String {
    let text = format!("{:?}", op.text);
    let mut line = match op.kind {
        OpKind::Delete => format!("  {} {}", "-".red().bold(), text.red().strikethrough()),
        OpKind::Insert => format!("  {} {}", "+".green().bold(), text.green()),
        OpKind::Equal => return String::new(),
    };
    if let Some(change) = label {
        if let Some(category) = change.category {
            line.push_str(&format!(" {}", paint_category(category)));
        }
        if let Some(explanation) = &change.explanation {
            line.push_str(&format!(" {}", explanation.dimmed()));
        }
    }
    line.push('\n');
    line
}

impl Outputter for CompareReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let stats = &self.result.stats;
        let mut output = String::new();

        output.push_str(&format!(
            "{} {} -> {}\n",
            "REDLINE:".cyan().bold(),
            self.original.yellow(),
            self.revised.green()
        ));

        if stats.total_changes == 0 {
            output.push_str(&format!("{}\n", "No differences.".green()));
            return output;
        }

        output.push_str(&format!(
            "Found {} changes in {} sections ({}ms)\n",
            stats.total_changes.to_string().cyan(),
            self.result.sections.len(),
            self.duration_ms
        ));

        let labels = self.labels();
        for section in &self.result.sections {
            output.push_str(&format!(
                "\n{} {}\n",
                section.name.bold(),
                format!("({} changes)", section.change_count()).dimmed()
            ));
            output.push_str(&format!("{}\n", "-".repeat(60)));
            for op in &section.ops {
                output.push_str(&format_op(op, labels.get(&op.id).copied()));
            }
        }

        let mut pairs = vec![
            ("Deletions", stats.deletions.to_string()),
            ("Insertions", stats.insertions.to_string()),
            ("Changed chars", stats.character_changes.to_string()),
            ("Original length", stats.original_length.to_string()),
            ("Revised length", stats.revised_length.to_string()),
        ];
        if let Some(counts) = self.category_counts() {
            for (category, count) in counts {
                pairs.push((category.as_str(), count.to_string()));
            }
        }
        output.push('\n');
        output.push_str(&TableOutput::format_key_value(&pairs, config));
        output
    }
}

/// Run the compare command
pub async fn run(
    original: &Path,
    revised: &Path,
    options: CompareOptions,
    config: &RedlineConfig,
    output: OutputConfig,
) -> Result<()> {
    let start = Instant::now();

    let original_text = read_document(original, None)?;
    let revised_text = read_document(revised, None)?;
    check_length(&original_text, config)?;
    check_length(&revised_text, config)?;

    let result = compare(&original_text, &revised_text);
    tracing::debug!(
        changes = result.stats.total_changes,
        sections = result.sections.len(),
        "comparison finished"
    );

    let categorized_changes = if options.classify || options.remote {
        let classifier = classifier(options.remote, config)?;
        Some(classifier.classify(&result.changes).await)
    } else {
        None
    };

    let report = CompareReport {
        original: original.display().to_string(),
        revised: revised.display().to_string(),
        result,
        categorized_changes,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Output::with_config(report, output).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use redline_core::ChangeClassifier;

    fn report(original: &str, revised: &str, classify: bool) -> CompareReport {
        let result = compare(original, revised);
        let categorized_changes =
            classify.then(|| ChangeClassifier::local().classify_local(&result.changes));
        CompareReport {
            original: "a.txt".to_string(),
            revised: "b.txt".to_string(),
            result,
            categorized_changes,
            duration_ms: 0,
        }
    }

    fn table_config() -> OutputConfig {
        colored::control::set_override(false);
        OutputConfig::new(OutputFormat::Table).without_truncation()
    }

    #[test]
    fn test_table_lists_changes_by_section() {
        let report = report(
            "1. PAYMENT\n\nThe fee is $100.",
            "1. PAYMENT\n\nThe fee is $200.",
            true,
        );
        let table = report.to_table(&table_config());

        assert!(table.contains("1. PAYMENT"));
        assert!(table.contains("- \"1\""));
        assert!(table.contains("[substantive]"));
        assert!(table.contains("Insertions"));
    }

    #[test]
    fn test_identical_documents() {
        let table = report("Same.", "Same.", false).to_table(&table_config());
        assert!(table.contains("No differences."));
    }

    #[test]
    fn test_json_flattens_result() {
        let report = report("The fee is $100.", "The fee is $200.", false);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["original"], "a.txt");
        assert_eq!(json["stats"]["totalChanges"], 2);
        assert!(json.get("categorizedChanges").is_none());
        assert!(json["normalizedOriginal"].is_string());
    }

    #[test]
    fn test_category_counts() {
        let report = report("Pay $100 now.", "Pay $200 now!", true);
        let counts = report.category_counts().unwrap();
        assert_eq!(counts[0].0, Category::Substantive);
        assert!(counts[0].1 >= 1);
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 4);
    }
}
