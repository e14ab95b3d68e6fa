//! Error types for redline-core.

use thiserror::Error;

/// Result type alias for redline-core operations.
pub type Result<T> = std::result::Result<T, RedlineError>;

/// Errors that can occur while extracting or comparing documents.
#[derive(Error, Debug)]
pub enum RedlineError {
    /// Declared document format is not one we can read.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// Archive opened but its main content part is absent.
    #[error("Document archive is missing its main content part: {part}")]
    MissingContentPart {
        /// Part name that was looked up.
        part: String,
    },

    /// Bytes are not a readable zip archive.
    #[error("Unreadable document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Malformed XML inside the archive.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Plain-text input that is not valid UTF-8.
    #[error("Invalid text encoding: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),

    /// IO error reading an archive member.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required request field was absent.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Input exceeds the configured comparison bound.
    #[error("Input too large: {length} characters exceeds maximum {max_length}")]
    InputTooLarge {
        /// Actual length of the input.
        length: usize,
        /// Maximum allowed length.
        max_length: usize,
    },
}

impl From<quick_xml::events::attributes::AttrError> for RedlineError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        RedlineError::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

impl RedlineError {
    /// Whether the failure was caused by the caller's input rather than by us.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, RedlineError::Io(_))
    }
}
