//! Rendering of list level values.

/// How a list level displays its counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberFormat {
    #[default]
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    /// Pattern is a literal glyph
    Bullet,
    /// No prefix at all
    None,
}

impl NumberFormat {
    /// Map a `w:numFmt` value. Unrecognized formats render as decimal.
    pub fn from_ooxml(val: &str) -> Self {
        match val {
            "decimal" => NumberFormat::Decimal,
            "lowerLetter" => NumberFormat::LowerLetter,
            "upperLetter" => NumberFormat::UpperLetter,
            "lowerRoman" => NumberFormat::LowerRoman,
            "upperRoman" => NumberFormat::UpperRoman,
            "bullet" => NumberFormat::Bullet,
            "none" => NumberFormat::None,
            other => {
                tracing::debug!(format = other, "unsupported number format, using decimal");
                NumberFormat::Decimal
            }
        }
    }

    /// Render `value` in this format.
    pub fn render(&self, value: u32) -> String {
        match self {
            NumberFormat::Decimal => value.to_string(),
            _ if value == 0 => String::new(),
            NumberFormat::LowerLetter => letter(value, b'a'),
            NumberFormat::UpperLetter => letter(value, b'A'),
            NumberFormat::LowerRoman | NumberFormat::UpperRoman if value > MAX_ROMAN => {
                value.to_string()
            }
            NumberFormat::LowerRoman => roman(value).to_lowercase(),
            NumberFormat::UpperRoman => roman(value),
            NumberFormat::Bullet | NumberFormat::None => String::new(),
        }
    }
}

/// 1 → a, 26 → z, 27 → a.
fn letter(value: u32, base: u8) -> String {
    let offset = ((value - 1) % 26) as u8;
    char::from(base + offset).to_string()
}

/// Values above this render in decimal instead of a run of `M`s.
const MAX_ROMAN: u32 = 3999;

const ROMAN: &[(u32, &str)] = &[
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

fn roman(mut value: u32) -> String {
    let mut out = String::new();
    for &(unit, glyphs) in ROMAN {
        while value >= unit {
            out.push_str(glyphs);
            value -= unit;
        }
    }
    out
}

/// Substitute `%1`..`%9` in `pattern` with rendered level values.
///
/// `level_value(k)` returns the value and format of level `k` (0-based).
pub fn render_pattern<F>(pattern: &str, level_value: F) -> String
where
    F: Fn(usize) -> (u32, NumberFormat),
{
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(level) = chars.peek().and_then(|d| d.to_digit(10)).filter(|d| (1..=9).contains(d)) {
                chars.next();
                let (value, format) = level_value(level as usize - 1);
                out.push_str(&format.render(value));
                continue;
            }
        }
        out.push(c);
    }
    out
}
