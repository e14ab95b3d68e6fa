//! Canonical text normalization.
//!
//! Every text that is diffed against another text, or embedded into a
//! generated document that will be diffed elsewhere, must pass through
//! [`normalize`]. There is exactly one substitution table; a second copy with
//! a slightly different character set reintroduces spurious redlines.
//!
//! The table maps visually-equivalent code points to a small ASCII alphabet:
//!
//! | Class                          | Output  |
//! |--------------------------------|---------|
//! | curly / guillemet double quote | `"`     |
//! | apostrophe / prime variants    | `'`     |
//! | dashes and minus signs         | `-`     |
//! | Unicode space variants         | ` `     |
//! | ellipsis                       | `...`   |
//! | bullets                        | `*`     |
//! | vulgar fractions ½ ¼ ¾         | `1/2` … |
//!
//! Section signs, pilcrows, currency symbols and trademark marks are kept
//! verbatim.

use serde::Serialize;
use std::fmt;
use std::ops::Deref;

/// Text that has been through [`normalize`].
///
/// The only constructor is [`normalize`], so holding a `NormalizedText` is
/// proof the canonical table was applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Length in Unicode scalar values.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for NormalizedText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Canonical replacement for a single code point, if it has one.
fn canonical(c: char) -> Option<&'static str> {
    let replacement = match c {
        // Double quotes
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{00AB}' | '\u{00BB}'
        | '\u{2033}' | '\u{301D}' | '\u{301E}' | '\u{301F}' | '\u{FF02}' => "\"",

        // Apostrophes and primes
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' | '\u{2035}'
        | '\u{2039}' | '\u{203A}' | '\u{02BC}' | '\u{FF07}' => "'",

        // Dashes and minus signs
        '\u{2010}'..='\u{2015}' | '\u{2212}' | '\u{FE58}' | '\u{FE63}' | '\u{FF0D}' => "-",

        // Space variants
        '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{202F}' | '\u{205F}'
        | '\u{3000}' => " ",

        '\u{2026}' => "...",

        // Bullets
        '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{2219}' | '\u{25AA}' | '\u{25CF}'
        | '\u{25E6}' => "*",

        '\u{00BD}' => "1/2",
        '\u{00BC}' => "1/4",
        '\u{00BE}' => "3/4",

        _ => return None,
    };
    Some(replacement)
}

/// Canonicalize `text`.
///
/// Total over any input and idempotent: every replacement is plain ASCII,
/// which the table never touches.
pub fn normalize(text: &str) -> NormalizedText {
    // Fast path: nothing outside ASCII means nothing to replace.
    if text.is_ascii() {
        return NormalizedText(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match canonical(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    NormalizedText(out)
}
