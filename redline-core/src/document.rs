//! Declared document formats and text extraction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{RedlineError, Result};
use crate::numbering::extract_with_numbering;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Input formats the pipeline can read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    /// WordprocessingML package
    Docx,
    /// UTF-8 text
    PlainText,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::PlainText => "txt",
        }
    }

    /// Guess the format from a file extension, defaulting to plain text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("docx") => DocumentFormat::Docx,
            _ => DocumentFormat::PlainText,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = RedlineError;

    /// Accepts short names, extensions and MIME types.
    fn from_str(s: &str) -> Result<Self> {
        let declared = s.trim().trim_start_matches('.').to_ascii_lowercase();
        // Drop MIME parameters such as "; charset=utf-8"
        let essence = declared.split(';').next().unwrap_or_default().trim();
        match essence {
            "docx" | DOCX_MIME => Ok(DocumentFormat::Docx),
            "txt" | "text" | "plain" | "text/plain" => Ok(DocumentFormat::PlainText),
            _ => Err(RedlineError::UnsupportedFormat(s.trim().to_string())),
        }
    }
}

/// Extract comparable text from raw document bytes.
pub fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String> {
    tracing::debug!(format = %format, bytes = bytes.len(), "extracting document text");
    match format {
        DocumentFormat::Docx => extract_with_numbering(bytes),
        DocumentFormat::PlainText => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            Ok(String::from_utf8(bytes.to_vec())?)
        }
    }
}
