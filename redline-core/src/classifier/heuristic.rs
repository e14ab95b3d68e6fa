//! Local materiality heuristics.
//!
//! Pure and deterministic; used on its own and as the fallback for every op
//! the external classifier does not label.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Category;

/// A pattern that marks a change as substantive.
pub struct SubstantiveRule {
    pub name: &'static str,
    pub explanation: &'static str,
    pub regex: &'static Lazy<Regex>,
}

static WHITESPACE_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());
static PUNCTUATION_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{P}\s]+$").unwrap());

static CURRENCY_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)[$€£¥]\s*\d|\b\d[\d,]*(?:\.\d+)?\s*(?:usd|eur|gbp|dollars|euros|pounds)\b|\b(?:usd|eur|gbp)\s*\d",
    )
    .unwrap()
});
static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d{1,2}/\d{1,2}/\d{2,4}\b|\b\d{4}-\d{2}-\d{2}\b|\b(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?\s+\d{1,2}\b",
    )
    .unwrap()
});
static PERIOD_OR_RATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d+\s*(?:business\s+|calendar\s+)?(?:days?|weeks?|months?|years?|percent|per\s+cent)\b|\d+(?:\.\d+)?\s*%",
    )
    .unwrap()
});
static OBLIGATION_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:shall|must|will|may\s+not|indemnif(?:y|ies|ied|ication)|terminat(?:e|es|ed|ion)|warrant(?:s|y|ies|ed)?|liab(?:le|ility|ilities)|breach(?:es|ed)?|penalt(?:y|ies)|damages|obligations?|covenants?|exclusive(?:ly)?|confidential(?:ity)?)\b",
    )
    .unwrap()
});
// Any changed figure in a legal text is treated as an amount.
static FIGURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

/// Substantive patterns in priority order.
///
/// The final `figure` rule matches any digit, so a change consisting of a
/// bare digit is Substantive. A character diff of `$100` against `$200`
/// leaves only `1` and `2`, and those still count as a monetary figure.
pub static SUBSTANTIVE_RULES: &[SubstantiveRule] = &[
    SubstantiveRule {
        name: "currency_amount",
        explanation: "Changes a monetary amount",
        regex: &CURRENCY_AMOUNT,
    },
    SubstantiveRule {
        name: "date",
        explanation: "Changes a date",
        regex: &DATE,
    },
    SubstantiveRule {
        name: "period_or_rate",
        explanation: "Changes a time period or percentage",
        regex: &PERIOD_OR_RATE,
    },
    SubstantiveRule {
        name: "obligation_keyword",
        explanation: "Touches obligation or liability language",
        regex: &OBLIGATION_KEYWORD,
    },
    SubstantiveRule {
        name: "figure",
        explanation: "Changes a numeric figure",
        regex: &FIGURE,
    },
];

/// Below this many chars an otherwise unmatched change is minor.
const SHORT_CHANGE: usize = 5;
/// Above this many chars an otherwise unmatched change is substantive.
const LONG_CHANGE: usize = 20;

/// Categorize one deleted or inserted fragment.
pub fn classify_text(text: &str) -> (Category, &'static str) {
    if WHITESPACE_ONLY.is_match(text) {
        return (Category::Formatting, "Whitespace-only change");
    }
    if PUNCTUATION_ONLY.is_match(text) {
        return (Category::Formatting, "Punctuation-only change");
    }
    if let Some(rule) = SUBSTANTIVE_RULES.iter().find(|rule| rule.regex.is_match(text)) {
        return (Category::Substantive, rule.explanation);
    }

    let len = text.chars().count();
    if len < SHORT_CHANGE {
        (Category::Minor, "Short wording change")
    } else if len > LONG_CHANGE {
        (Category::Substantive, "Extended wording change")
    } else {
        (Category::Minor, "Minor wording change")
    }
}

/// Name of the first substantive rule matching `text`, if any.
pub fn matching_rule(text: &str) -> Option<&'static str> {
    SUBSTANTIVE_RULES
        .iter()
        .find(|rule| rule.regex.is_match(text))
        .map(|rule| rule.name)
}
