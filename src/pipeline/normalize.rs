//! Text normalisation applied to everything read out of a PDF.
//!
//! Report PDFs encode numbers with typographic characters that neither
//! [`crate::numeric::safe_float`] nor the column matcher expects: a real minus
//! sign (U+2212) in front of enthalpies, non-breaking spaces inside cells, and
//! zero-width joiners left behind by the producer. These rules map them to
//! plain ASCII before any table finder or scraper sees the text.
//!
//! Whitespace *runs* are preserved: the text scraper splits on two or more
//! spaces, so collapsing them here would destroy its column boundaries.
//!
//! ## Rule Order
//!
//! Line endings first so the per-line rules see `\n` only; invisible
//! characters last so a soft hyphen next to a dash cannot hide it from the
//! minus rule's digit lookahead.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply every rule to a page's full text.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Map typographic minus signs to `-`
/// 3. Map non-breaking and fixed-width spaces to a plain space
/// 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens, etc.)
/// 5. Trim trailing whitespace per line
pub fn clean_page_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = clean_fragment(&s);
    trim_trailing_whitespace(&s)
}

/// Rules 2–4 for a single table cell.
pub fn clean_fragment(input: &str) -> String {
    let s = normalise_minus_signs(input);
    let s = normalise_spaces(&s);
    remove_invisible_chars(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Typographic minus signs ──────────────────────────────────────────

/// An en dash is only a minus when a digit (or decimal point) follows it;
/// elsewhere it is punctuation in a species name.
static RE_EN_DASH_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\u{2013}([0-9.])").unwrap());

fn normalise_minus_signs(input: &str) -> String {
    let s = input.replace('\u{2212}', "-");
    RE_EN_DASH_NUMBER.replace_all(&s, "-$1").into_owned()
}

// ── Rule 3: Fixed-width spaces ───────────────────────────────────────────────

fn normalise_spaces(input: &str) -> String {
    input.replace(['\u{00A0}', '\u{2007}', '\u{202F}'], " ")
}

// ── Rule 4: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 5: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalise_line_endings() {
        assert_eq!(normalise_line_endings("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_unicode_minus() {
        assert_eq!(normalise_minus_signs("\u{2212}393.5"), "-393.5");
    }

    #[test]
    fn test_en_dash_only_before_digits() {
        assert_eq!(normalise_minus_signs("\u{2013}74.9"), "-74.9");
        assert_eq!(normalise_minus_signs("\u{2013}.5"), "-.5");
        assert_eq!(
            normalise_minus_signs("Carbon \u{2013} dioxide"),
            "Carbon \u{2013} dioxide"
        );
    }

    #[test]
    fn test_spaces() {
        assert_eq!(normalise_spaces("CO2\u{00A0}\u{00A0}-393.5"), "CO2  -393.5");
    }

    #[test]
    fn test_remove_invisible() {
        let input = "hello\u{200B}world\u{FEFF}foo\u{00AD}bar";
        assert_eq!(remove_invisible_chars(input), "helloworldfoobar");
    }

    #[test]
    fn test_clean_page_text_keeps_whitespace_runs() {
        let input = "CO2  \u{2212}393.5   213.8  \r\nH2O\u{00A0} \u{2212}285.8\u{200B}  ";
        assert_eq!(
            clean_page_text(input),
            "CO2  -393.5   213.8\nH2O  -285.8"
        );
    }
}
