//! Materiality classification of diff ops.
//!
//! One classifier, two strategies. [`Strategy::LocalHeuristic`] labels every
//! change with the pure rules in [`heuristic`]. [`Strategy::ExternalBatch`]
//! sends the changes to a [`BatchClassifier`] and keeps the heuristic label for
//! anything the service does not answer for, so every change always ends up
//! with a category.

pub mod external;
pub mod heuristic;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::differ::DiffOp;
pub use external::{
    parse_verdicts, truncate_chars, BatchClassifier, BatchFuture, BatchItem, BatchVerdict,
    ClassifierError, Direction,
};

/// How much a change matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Alters rights, obligations, amounts, dates or scope
    Substantive,
    /// Whitespace or punctuation only
    Formatting,
    /// Wording that does not change meaning
    Minor,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Substantive => "substantive",
            Category::Formatting => "formatting",
            Category::Minor => "minor",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "substantive" => Ok(Category::Substantive),
            "formatting" => Ok(Category::Formatting),
            "minor" => Ok(Category::Minor),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Which strategy produced a label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    Heuristic,
    External,
}

/// A diff op with its materiality label. Equal ops carry no label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedChange {
    #[serde(flatten)]
    pub op: DiffOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classified_by: Option<ClassificationSource>,
}

impl ClassifiedChange {
    fn heuristic(op: &DiffOp) -> Self {
        if !op.is_change() {
            return Self {
                op: op.clone(),
                category: None,
                explanation: None,
                classified_by: None,
            };
        }
        let (category, explanation) = heuristic::classify_text(&op.text);
        Self {
            op: op.clone(),
            category: Some(category),
            explanation: Some(explanation.to_string()),
            classified_by: Some(ClassificationSource::Heuristic),
        }
    }
}

/// Strategy chosen for one classification call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    LocalHeuristic,
    ExternalBatch,
}

/// Limits on the external path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifierPolicy {
    /// Largest change count sent to the external classifier
    pub max_batch: usize,
    /// Upper bound on the external call
    pub timeout: Duration,
    /// Per-change text limit in the batch request
    pub max_text_chars: usize,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        Self {
            max_batch: 50,
            timeout: Duration::from_secs(15),
            max_text_chars: 500,
        }
    }
}

/// Labels diff ops, optionally consulting an external service.
#[derive(Clone)]
pub struct ChangeClassifier {
    external: Option<Arc<dyn BatchClassifier>>,
    policy: ClassifierPolicy,
}

impl fmt::Debug for ChangeClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeClassifier")
            .field("external", &self.external.as_ref().map(|c| c.name().to_string()))
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for ChangeClassifier {
    fn default() -> Self {
        Self::local()
    }
}

impl ChangeClassifier {
    /// Heuristic-only classifier.
    pub fn local() -> Self {
        Self {
            external: None,
            policy: ClassifierPolicy::default(),
        }
    }

    pub fn with_external(external: Arc<dyn BatchClassifier>, policy: ClassifierPolicy) -> Self {
        Self {
            external: Some(external),
            policy,
        }
    }

    pub fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    /// Name of the external classifier, if one is configured.
    pub fn external_name(&self) -> Option<&str> {
        self.external.as_deref().map(|c| c.name())
    }

    /// Strategy used for a call with `change_count` non-equal ops.
    pub fn strategy_for(&self, change_count: usize) -> Strategy {
        match self.external {
            Some(_) if change_count > 0 && change_count <= self.policy.max_batch => {
                Strategy::ExternalBatch
            }
            _ => Strategy::LocalHeuristic,
        }
    }

    /// Label every op with the local heuristics.
    pub fn classify_local(&self, ops: &[DiffOp]) -> Vec<ClassifiedChange> {
        ops.iter().map(ClassifiedChange::heuristic).collect()
    }

    /// Label every op, asking the external classifier when the policy allows.
    ///
    /// Never fails: any external problem leaves the heuristic labels in place.
    pub async fn classify(&self, ops: &[DiffOp]) -> Vec<ClassifiedChange> {
        let mut classified = self.classify_local(ops);

        let Some(external) = self.external.as_deref() else {
            return classified;
        };

        let items: Vec<BatchItem> = ops
            .iter()
            .filter_map(|op| BatchItem::from_op(op, self.policy.max_text_chars))
            .collect();

        if self.strategy_for(items.len()) == Strategy::LocalHeuristic {
            if items.len() > self.policy.max_batch {
                let err = ClassifierError::BatchTooLarge {
                    len: items.len(),
                    max: self.policy.max_batch,
                };
                tracing::debug!(classifier = external.name(), "{}; using heuristics", err);
            }
            return classified;
        }

        let verdicts =
            match tokio::time::timeout(self.policy.timeout, external.classify_batch(&items)).await
            {
                Ok(Ok(verdicts)) => verdicts,
                Ok(Err(e)) => {
                    tracing::warn!(classifier = external.name(), "external classification failed: {}", e);
                    return classified;
                }
                Err(_) => {
                    let e = ClassifierError::Timeout(self.policy.timeout);
                    tracing::warn!(classifier = external.name(), "external classification failed: {}", e);
                    return classified;
                }
            };

        let applied = apply_verdicts(&mut classified, verdicts);
        tracing::debug!(
            classifier = external.name(),
            requested = items.len(),
            applied,
            "merged external verdicts"
        );
        classified
    }
}

/// Overwrite heuristic labels with usable verdicts. Returns how many applied.
fn apply_verdicts(classified: &mut [ClassifiedChange], verdicts: Vec<BatchVerdict>) -> usize {
    let mut by_id: HashMap<u32, usize> = HashMap::new();
    for (pos, change) in classified.iter().enumerate() {
        if change.op.is_change() {
            by_id.entry(change.op.id).or_insert(pos);
        }
    }

    let mut applied = 0;
    for verdict in verdicts {
        let Some(&pos) = by_id.get(&verdict.id) else {
            tracing::debug!(id = verdict.id, "verdict for unknown change id");
            continue;
        };
        let category = match verdict.category.parse::<Category>() {
            Ok(category) => category,
            Err(e) => {
                tracing::debug!(id = verdict.id, "{}; keeping heuristic label", e);
                continue;
            }
        };
        let change = &mut classified[pos];
        change.category = Some(category);
        if verdict.explanation.is_some() {
            change.explanation = verdict.explanation;
        }
        change.classified_by = Some(ClassificationSource::External);
        applied += 1;
    }
    applied
}
