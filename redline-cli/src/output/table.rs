//! Table output formatting using the `tabled` crate.

use super::OutputConfig;
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Alignment, Modify, Width},
    Table,
};

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Format a simple key-value table
    pub fn format_key_value(pairs: &[(&str, String)], config: &OutputConfig) -> String {
        let mut builder = Builder::default();
        for (key, value) in pairs {
            builder.push_record([*key, value.as_str()]);
        }

        let mut table = builder.build();
        Self::style(&mut table, config);
        table.with(Modify::new(Columns::first()).with(Alignment::right()));
        Self::fit(&mut table, config);
        table.to_string()
    }

    /// Create a simple table from rows of strings
    pub fn from_rows(headers: &[&str], rows: &[Vec<String>], config: &OutputConfig) -> String {
        if rows.is_empty() {
            return "(no results)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());
        for row in rows {
            builder.push_record(row.iter().map(|s| s.as_str()));
        }

        let mut table = builder.build();
        Self::style(&mut table, config);
        Self::fit(&mut table, config);
        table.to_string()
    }

    fn style(table: &mut Table, config: &OutputConfig) {
        if config.compact {
            table.with(Style::blank());
        } else {
            table.with(Style::rounded());
        }
    }

    fn fit(table: &mut Table, config: &OutputConfig) {
        if config.should_truncate() {
            table.with(Width::wrap(config.effective_width()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_key_value_table() {
        let pairs = vec![("Insertions", "3".to_string()), ("Deletions", "1".to_string())];
        let config = OutputConfig::new(OutputFormat::Table).without_truncation();
        let output = TableOutput::format_key_value(&pairs, &config);

        assert!(output.contains("Insertions"));
        assert!(output.contains('3'));
    }

    #[test]
    fn test_from_rows() {
        let rows = vec![
            vec!["1".to_string(), "delete".to_string()],
            vec!["2".to_string(), "insert".to_string()],
        ];
        let config = OutputConfig::new(OutputFormat::Table).without_truncation();
        let output = TableOutput::from_rows(&["ID", "KIND"], &rows, &config);

        assert!(output.contains("KIND"));
        assert!(output.contains("insert"));
    }

    #[test]
    fn test_empty_rows() {
        let config = OutputConfig::new(OutputFormat::Table);
        assert_eq!(TableOutput::from_rows(&["ID"], &[], &config), "(no results)");
    }
}
