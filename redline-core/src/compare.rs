//! End-to-end comparison of two texts.

use serde::Serialize;

use crate::differ::{diff, DiffOp};
use crate::normalize::{normalize, NormalizedText};
use crate::segmenter::{group, Section};

/// Counts over one comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStats {
    /// Non-equal ops
    pub total_changes: usize,
    pub deletions: usize,
    pub insertions: usize,
    /// Length of the raw original in chars
    pub original_length: usize,
    /// Length of the raw revised text in chars
    pub revised_length: usize,
    /// Chars inside non-equal ops
    pub character_changes: usize,
}

impl ComparisonStats {
    fn from_ops(original: &str, revised: &str, ops: &[DiffOp]) -> Self {
        let mut stats = ComparisonStats {
            original_length: original.chars().count(),
            revised_length: revised.chars().count(),
            ..Default::default()
        };
        for op in ops.iter().filter(|op| op.is_change()) {
            stats.total_changes += 1;
            if op.kind.in_original() {
                stats.deletions += 1;
            } else {
                stats.insertions += 1;
            }
            stats.character_changes += op.text.chars().count();
        }
        stats
    }
}

/// Output of [`compare`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub changes: Vec<DiffOp>,
    pub stats: ComparisonStats,
    pub sections: Vec<Section>,
    pub normalized_original: NormalizedText,
    pub normalized_revised: NormalizedText,
}

/// Normalize both texts, diff them and group the changes by section.
///
/// ```
/// use redline_core::compare;
///
/// let result = compare("The fee is $100.", "The fee is $200.");
/// assert_eq!(result.stats.deletions, 1);
/// assert_eq!(result.stats.insertions, 1);
/// ```
pub fn compare(original: &str, revised: &str) -> ComparisonResult {
    let normalized_original = normalize(original);
    let normalized_revised = normalize(revised);

    let changes = diff(&normalized_original, &normalized_revised);
    let sections = group(&normalized_original, &changes);
    let stats = ComparisonStats::from_ops(original, revised, &changes);

    tracing::debug!(
        changes = stats.total_changes,
        sections = sections.len(),
        "compared documents"
    );

    ComparisonResult {
        changes,
        stats,
        sections,
        normalized_original,
        normalized_revised,
    }
}
