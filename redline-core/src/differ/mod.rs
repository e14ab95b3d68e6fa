//! Character-level diff engine for normalized text.
//!
//! The engine computes a shortest edit script with Myers' O(ND) algorithm
//! (linear-space middle-snake bisection), then runs a semantic cleanup pass
//! so that a single change is not fragmented into many one-character ops.
//!
//! # Example
//!
//! ```
//! use redline_core::differ::{diff, OpKind};
//! use redline_core::normalize;
//!
//! let ops = diff(&normalize("The fee is $100."), &normalize("The fee is $200."));
//! assert_eq!(ops[0].kind, OpKind::Equal);
//! assert!(ops.iter().any(|op| op.kind == OpKind::Delete));
//! ```

mod cleanup;
mod myers;

use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedText;

/// Kind of a diff op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Delete,
    Insert,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Equal => "equal",
            OpKind::Delete => "delete",
            OpKind::Insert => "insert",
        }
    }

    /// Whether text of this kind exists in the original document.
    pub fn in_original(&self) -> bool {
        matches!(self, OpKind::Equal | OpKind::Delete)
    }

    /// Whether text of this kind exists in the revised document.
    pub fn in_revised(&self) -> bool {
        matches!(self, OpKind::Equal | OpKind::Insert)
    }
}

/// One unit of the edit script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffOp {
    /// Position in the edit script, starting at 0.
    pub id: u32,
    pub kind: OpKind,
    pub text: String,
}

impl DiffOp {
    pub fn new(id: u32, kind: OpKind, text: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != OpKind::Equal
    }
}

/// Working representation used while building and cleaning the script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Edit {
    pub kind: OpKind,
    pub text: Vec<char>,
}

impl Edit {
    pub fn new(kind: OpKind, text: Vec<char>) -> Self {
        Self { kind, text }
    }
}

/// Diff two normalized texts.
///
/// Concatenating the `Equal` and `Delete` ops reproduces `original`;
/// concatenating the `Equal` and `Insert` ops reproduces `revised`.
pub fn diff(original: &NormalizedText, revised: &NormalizedText) -> Vec<DiffOp> {
    let a: Vec<char> = original.chars().collect();
    let b: Vec<char> = revised.chars().collect();

    let raw = myers::diff_chars(&a, &b);
    let raw_len = raw.len();
    let cleaned = cleanup::cleanup(raw);

    tracing::debug!(
        original_chars = a.len(),
        revised_chars = b.len(),
        raw_ops = raw_len,
        ops = cleaned.len(),
        "diff computed"
    );

    into_ops(cleaned)
}

/// Run the semantic cleanup over an existing op sequence and renumber it.
///
/// Cleanup is idempotent: feeding the output back in returns it unchanged.
pub fn cleanup_ops(ops: &[DiffOp]) -> Vec<DiffOp> {
    let edits = ops
        .iter()
        .map(|op| Edit::new(op.kind, op.text.chars().collect()))
        .collect();
    into_ops(cleanup::cleanup(edits))
}

/// Text of the original document as described by `ops`.
pub fn original_text(ops: &[DiffOp]) -> String {
    ops.iter()
        .filter(|op| op.kind.in_original())
        .map(|op| op.text.as_str())
        .collect()
}

/// Text of the revised document as described by `ops`.
pub fn revised_text(ops: &[DiffOp]) -> String {
    ops.iter()
        .filter(|op| op.kind.in_revised())
        .map(|op| op.text.as_str())
        .collect()
}

fn into_ops(edits: Vec<Edit>) -> Vec<DiffOp> {
    edits
        .into_iter()
        .enumerate()
        .map(|(id, edit)| DiffOp {
            id: id as u32,
            kind: edit.kind,
            text: edit.text.into_iter().collect(),
        })
        .collect()
}
