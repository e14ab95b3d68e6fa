//! Section-aware grouping of diff ops.
//!
//! Walks the op sequence, detects structural headers ("ARTICLE 2",
//! "1. DEFINITIONS", "GOVERNING LAW") in text that exists in the original
//! document, and buckets ops into named sections. Sections without a single
//! delete or insert are dropped.
//!
//! Insert-only text never defines a boundary: a header that exists only in the
//! revised document must not rename history.

pub mod headers;

use serde::{Deserialize, Serialize};

use crate::differ::DiffOp;
pub use headers::detect_header;

/// Name of the section in effect before the first header.
pub const DOCUMENT_START: &str = "Document Start";

/// A named bucket of ops for one structural region of the document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub ops: Vec<DiffOp>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ops: Vec::new(),
        }
    }

    /// Whether the section holds at least one delete or insert.
    pub fn has_changes(&self) -> bool {
        self.ops.iter().any(DiffOp::is_change)
    }

    pub fn change_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_change()).count()
    }
}

/// Partition `ops` into sections named after the headers they fall under.
///
/// `normalized_original` is the text the `Equal`/`Delete` ops were cut from;
/// it lets header lines split across several ops be recognized whole. The op
/// carrying a header line opens the new section.
pub fn group(normalized_original: &str, ops: &[DiffOp]) -> Vec<Section> {
    let mut lines = LineIndex::new(normalized_original);
    let mut sections = Vec::new();
    let mut current = Section::new(DOCUMENT_START);

    for op in ops {
        if op.kind.in_original() {
            for name in lines.headers_in(&op.text) {
                if current.has_changes() {
                    sections.push(std::mem::replace(&mut current, Section::new(name)));
                } else {
                    current.name = name;
                }
            }
        }
        current.ops.push(op.clone());
    }

    if current.has_changes() {
        sections.push(current);
    }

    tracing::debug!(ops = ops.len(), sections = sections.len(), "grouped diff into sections");
    sections
}

/// Cursor over the line starts of the original text.
struct LineIndex<'a> {
    original: &'a str,
    starts: Vec<usize>,
    next_line: usize,
    cursor: usize,
    aligned: bool,
}

impl<'a> LineIndex<'a> {
    fn new(original: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(original.match_indices('\n').map(|(i, _)| i + 1))
            .filter(|&i| i < original.len())
            .collect();
        Self {
            original,
            starts,
            next_line: 0,
            cursor: 0,
            aligned: true,
        }
    }

    /// Header names for lines whose first character lies in the next op.
    ///
    /// Falls back to the op's own lines once the ops stop lining up with the
    /// original text.
    fn headers_in(&mut self, text: &str) -> Vec<String> {
        let start = self.cursor;
        let end = start + text.len();
        self.cursor = end;

        if self.aligned && self.original.get(start..end) != Some(text) {
            tracing::debug!(offset = start, "diff ops do not match original text");
            self.aligned = false;
        }
        if !self.aligned {
            return text.lines().filter_map(detect_header).collect();
        }

        let mut names = Vec::new();
        while let Some(&line_start) = self.starts.get(self.next_line) {
            if line_start >= end {
                break;
            }
            self.next_line += 1;
            if line_start < start {
                continue;
            }
            let line_end = self.original[line_start..]
                .find('\n')
                .map_or(self.original.len(), |pos| line_start + pos);
            if let Some(name) = detect_header(&self.original[line_start..line_end]) {
                names.push(name);
            }
        }
        names
    }
}
