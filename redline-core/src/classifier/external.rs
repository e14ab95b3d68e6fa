//! Seam for a higher-cost external classification service.
//!
//! The core only defines the request/response shapes and the trait; the
//! daemon provides an HTTP implementation. Responses are parsed leniently
//! because the service is typically a language model returning a text blob.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

use crate::differ::{DiffOp, OpKind};

/// Errors from the external classification path.
///
/// None of these reach callers of the classifier; they only trigger the
/// heuristic fallback.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// Network or HTTP-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// No answer within the configured bound
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Response could not be interpreted
    #[error("malformed response: {0}")]
    Malformed(String),

    /// More changes than the service accepts in one call
    #[error("batch of {len} exceeds maximum {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// Credentials rejected or unobtainable
    #[error("authentication failed: {0}")]
    Auth(String),
}

/// Which side of the comparison a change belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Deleted,
    Inserted,
}

/// One change submitted for classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub id: u32,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub text: String,
}

impl BatchItem {
    /// Build an item from a non-equal op, truncating its text to `max_chars`.
    pub fn from_op(op: &DiffOp, max_chars: usize) -> Option<Self> {
        let direction = match op.kind {
            OpKind::Delete => Direction::Deleted,
            OpKind::Insert => Direction::Inserted,
            OpKind::Equal => return None,
        };
        Some(Self {
            id: op.id,
            direction,
            text: truncate_chars(&op.text, max_chars),
        })
    }
}

/// One label returned by the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchVerdict {
    pub id: u32,
    /// Raw category string; unknown values fall back to the heuristic.
    pub category: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Boxed future returned by [`BatchClassifier::classify_batch`].
pub type BatchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<BatchVerdict>, ClassifierError>> + Send + 'a>>;

/// An external service that labels a batch of changes.
///
/// # Example
///
/// ```ignore
/// use redline_core::classifier::{BatchClassifier, BatchFuture, BatchItem, BatchVerdict};
///
/// struct EverythingMinor;
///
/// impl BatchClassifier for EverythingMinor {
///     fn classify_batch<'a>(&'a self, items: &'a [BatchItem]) -> BatchFuture<'a> {
///         Box::pin(async move {
///             Ok(items
///                 .iter()
///                 .map(|item| BatchVerdict {
///                     id: item.id,
///                     category: "minor".to_string(),
///                     explanation: None,
///                 })
///                 .collect())
///         })
///     }
///
///     fn name(&self) -> &str {
///         "everything-minor"
///     }
/// }
/// ```
pub trait BatchClassifier: Send + Sync {
    /// Label every item in `items`. Missing ids are allowed.
    fn classify_batch<'a>(&'a self, items: &'a [BatchItem]) -> BatchFuture<'a>;

    /// Identifier used in logs.
    fn name(&self) -> &str;
}

/// Keep at most `max_chars` chars of `text`, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Interpret a service response body.
///
/// Accepted shapes: a JSON array of verdicts; an object holding that array
/// under `categorizations`, `results` or `changes`; or a text blob (bare JSON
/// string, or an object with `text`, `content` or `output`) with the array
/// embedded somewhere inside. Array entries that are not verdicts are
/// skipped.
pub fn parse_verdicts(body: &str) -> Result<Vec<BatchVerdict>, ClassifierError> {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => verdicts_from_value(value),
        Err(_) => verdicts_from_blob(body),
    }
}

fn verdicts_from_value(value: Value) -> Result<Vec<BatchVerdict>, ClassifierError> {
    match value {
        Value::Array(entries) => Ok(entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<BatchVerdict>(entry).ok())
            .collect()),
        Value::Object(mut map) => {
            for key in ["categorizations", "results", "changes"] {
                if let Some(inner @ Value::Array(_)) = map.remove(key) {
                    return verdicts_from_value(inner);
                }
            }
            for key in ["text", "content", "output"] {
                if let Some(Value::String(blob)) = map.remove(key) {
                    return verdicts_from_blob(&blob);
                }
            }
            Err(ClassifierError::Malformed(
                "object without a verdict list".to_string(),
            ))
        }
        Value::String(blob) => verdicts_from_blob(&blob),
        other => Err(ClassifierError::Malformed(format!(
            "unexpected JSON value: {}",
            other
        ))),
    }
}

/// Pull the outermost `[...]` out of free text and parse it.
fn verdicts_from_blob(blob: &str) -> Result<Vec<BatchVerdict>, ClassifierError> {
    let (Some(start), Some(end)) = (blob.find('['), blob.rfind(']')) else {
        return Err(ClassifierError::Malformed("no JSON array in response".to_string()));
    };
    if end < start {
        return Err(ClassifierError::Malformed("no JSON array in response".to_string()));
    }
    match serde_json::from_str::<Value>(&blob[start..=end]) {
        Ok(value @ Value::Array(_)) => verdicts_from_value(value),
        Ok(_) => Err(ClassifierError::Malformed("embedded value is not an array".to_string())),
        Err(e) => Err(ClassifierError::Malformed(e.to_string())),
    }
}
