//! Structural header detection.
//!
//! Header recognition is an ordered list of matchers. Each matcher looks at a
//! single line and returns the section name when it recognizes a header.

use once_cell::sync::Lazy;
use regex::Regex;

/// A header matcher: returns the section name for a header line.
pub type HeaderMatcher = fn(&str) -> Option<String>;

/// Matchers in priority order.
pub static DEFAULT_MATCHERS: &[(&str, HeaderMatcher)] = &[
    ("keyword", match_keyword),
    ("enumerated", match_enumerated),
    ("all_caps", match_all_caps),
];

/// Names longer than this are cut back to the keyword and identifier.
const MAX_FULL_LINE_NAME: usize = 60;

static KEYWORD_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(section|article|exhibit|schedule|annex|appendix)\s+([0-9]+(?:\.[0-9]+)*|(?-i:[A-Z]{1,4}))\b",
    )
    .unwrap()
});
static ENUMERATED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)*\.?\s+[A-Z][A-Z]+\b").unwrap());
static ALL_CAPS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z ]+$").unwrap());

/// "SECTION 1", "Article 2.3", "EXHIBIT A".
pub fn match_keyword(line: &str) -> Option<String> {
    let caps = KEYWORD_HEADER.captures(line)?;
    if line.chars().count() <= MAX_FULL_LINE_NAME {
        Some(first_run(line).to_string())
    } else {
        Some(format!("{} {}", &caps[1], &caps[2]))
    }
}

/// "1. DEFINITIONS", "4.2 PAYMENT TERMS  The Buyer shall...".
pub fn match_enumerated(line: &str) -> Option<String> {
    if ENUMERATED_HEADER.is_match(line) {
        Some(first_run(line).to_string())
    } else {
        None
    }
}

/// A short line of capitals such as "GOVERNING LAW".
pub fn match_all_caps(line: &str) -> Option<String> {
    let len = line.chars().count();
    if !(10..=60).contains(&len) || line.contains("  ") || !ALL_CAPS_LINE.is_match(line) {
        return None;
    }
    Some(line.to_string())
}

/// Text up to the first run of two or more spaces.
fn first_run(line: &str) -> &str {
    match line.find("  ") {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

/// Run the matchers over a line and return the first header name found.
pub fn detect_header(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    DEFAULT_MATCHERS.iter().find_map(|(name, matcher)| {
        let header = matcher(line)?;
        tracing::trace!(matcher = *name, header = %header, "header detected");
        Some(header)
    })
}
