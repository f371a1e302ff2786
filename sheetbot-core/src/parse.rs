//! Cell value normalization.
//!
//! Sheet exports group digits with ordinary, no-break (U+00A0) or narrow no-break (U+202F)
//! spaces depending on the locale of whoever typed the value. All three are stripped before
//! any numeric interpretation.

use crate::error::ParseError;

const GROUP_SEPARATORS: [char; 3] = [' ', '\u{a0}', '\u{202f}'];

pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !GROUP_SEPARATORS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Unsigned integer record count. Anything but ASCII digits (after cleaning) is `None`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let cleaned = clean(raw);
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Currency or volume figure. Non-finite results are rejected.
pub fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    clean(raw)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::new(raw))
}

/// Amounts are reported as whole units, truncated toward zero.
pub fn truncate_amount(value: f64) -> i64 {
    value.trunc() as i64
}

/// Checkbox cells export as the literal `TRUE`.
pub fn parse_flag(raw: &str) -> bool {
    raw.trim() == "TRUE"
}
