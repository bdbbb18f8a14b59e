//! Numeric coercion for cells and tokens of unknown formatting.
//!
//! Two entry points with different tolerance:
//!
//! * [`safe_float`]: lenient. Drops thousands separators and every character
//!   that cannot be part of a decimal or exponent literal, then parses. Used for
//!   PDF table cells and scraped segments (`"1,234.5 kJ"` → `1234.5`).
//! * [`parse_number`]: strict. The whole trimmed token must be a number. Used
//!   by the markdown tokenizer, where a formula such as `H2` must not be read
//!   as `2`.
//!
//! Both return `None` instead of failing, and never yield NaN or infinity.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_NON_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9+\-.Ee]").unwrap());

/// Coerce an arbitrary cell string to a float.
///
/// Returns `None` for empty input or when nothing parseable remains.
pub fn safe_float(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let without_separators = trimmed.replace(',', "");
    let cleaned = RE_NON_NUMERIC.replace_all(&without_separators, "");
    finite(cleaned.parse::<f64>().ok()?)
}

/// Lenient coercion of an optional cell (a missing cell is absent).
pub fn safe_float_opt(value: Option<&str>) -> Option<f64> {
    value.and_then(safe_float)
}

/// Parse a token that must be a number in its entirety.
pub fn parse_number(token: &str) -> Option<f64> {
    finite(token.trim().parse::<f64>().ok()?)
}

/// Whether a token parses strictly as a number.
pub fn is_number(token: &str) -> bool {
    parse_number(token).is_some()
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_separators_and_units() {
        assert_eq!(safe_float("1,234.5 kJ"), Some(1234.5));
        assert_eq!(safe_float("-393.5 kJ/mol"), Some(-393.5));
        assert_eq!(safe_float(" 213.8* "), Some(213.8));
    }

    #[test]
    fn exponent_survives() {
        assert_eq!(safe_float("1.5E3"), Some(1500.0));
        assert_eq!(safe_float("2e-2"), Some(0.02));
    }

    #[test]
    fn empty_and_garbage_are_absent() {
        assert_eq!(safe_float(""), None);
        assert_eq!(safe_float("   "), None);
        assert_eq!(safe_float("n/a"), None);
        assert_eq!(safe_float("--"), None);
        assert_eq!(safe_float_opt(None), None);
    }

    #[test]
    fn coercion_is_idempotent() {
        for v in [0.0, -241.8, 1234.5, 2.016, -0.001] {
            let once = safe_float(&v.to_string()).unwrap();
            assert_eq!(once, v);
            assert_eq!(safe_float(&once.to_string()), Some(once));
        }
    }

    #[test]
    fn strict_parse_rejects_formulas() {
        assert_eq!(parse_number("H2"), None);
        assert_eq!(parse_number("-241.8"), Some(-241.8));
        assert_eq!(parse_number("exact"), None);
        assert!(!is_number("kJ/mol"));
        assert!(is_number("0.0"));
    }

    #[test]
    fn non_finite_is_absent() {
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
    }
}
