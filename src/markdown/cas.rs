//! CAS registry number and relative-rank splitting.

use once_cell::sync::Lazy;
use regex::Regex;

/// A bare CAS registry number, e.g. `7732-18-5`.
pub static RE_CAS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d$").unwrap());

/// A CAS number carrying a relative rank, e.g. `7732-18-5*1`.
pub static RE_CAS_RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,7}-\d{2}-\d\*\d+$").unwrap());

/// Whether a token terminates a record group.
pub fn is_cas_relative(token: &str) -> bool {
    token.contains('*') && RE_CAS_RELATIVE.is_match(token)
}

/// Split `CAS*rank` into its parts.
///
/// * With a `*`: everything before the first `*` is the CAS number (absent if
///   blank), the rest is the rank (absent if it is not an integer).
/// * Without a `*`: the whole token is kept only if it is a bare CAS number.
/// * Otherwise both parts are absent.
pub fn split_cas_and_relative(token: &str) -> (Option<String>, Option<i64>) {
    let token = token.trim();
    if let Some((cas, rel)) = token.split_once('*') {
        let cas = cas.trim();
        let cas = (!cas.is_empty()).then(|| cas.to_string());
        return (cas, rel.trim().parse::<i64>().ok());
    }
    if RE_CAS.is_match(token) {
        return (Some(token.to_string()), None);
    }
    (None, None)
}
