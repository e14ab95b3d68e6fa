//! Redline Core - deterministic document comparison.
//!
//! This crate turns two versions of a contract into a structured redline:
//! which characters were deleted or inserted, under which section heading,
//! and how much each change matters.
//!
//! # Features
//!
//! - **Canonical normalization**: one substitution table for quotes, dashes,
//!   spaces, ellipses, bullets and fractions
//! - **Character diff**: Myers' algorithm with semantic cleanup
//! - **Section grouping**: changes bucketed under detected headers
//! - **Materiality**: local heuristics with an optional external classifier
//! - **DOCX numbering**: list numbers restored during text extraction
//!
//! # Usage
//!
//! ```
//! use redline_core::{compare, ChangeClassifier, Category};
//!
//! let result = compare("The fee is $100.", "The fee is $200.");
//! let classified = ChangeClassifier::local().classify_local(&result.changes);
//! assert!(classified
//!     .iter()
//!     .filter_map(|c| c.category)
//!     .all(|category| category == Category::Substantive));
//! ```

pub mod classifier;
pub mod compare;
pub mod differ;
pub mod document;
pub mod error;
pub mod normalize;
pub mod numbering;
pub mod segmenter;

pub use classifier::{
    BatchClassifier, Category, ChangeClassifier, ClassificationSource, ClassifiedChange,
    ClassifierError, ClassifierPolicy, Strategy,
};
pub use compare::{compare, ComparisonResult, ComparisonStats};
pub use differ::{diff, DiffOp, OpKind};
pub use document::{extract_text, DocumentFormat};
pub use error::{RedlineError, Result};
pub use normalize::{normalize, NormalizedText};
pub use numbering::extract_with_numbering;
pub use segmenter::{group, Section, DOCUMENT_START};
