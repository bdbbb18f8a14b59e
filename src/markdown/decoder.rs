//! Positional field decoder: a pull parser over the token stream.
//!
//! Slots are decoded strictly in order with one forward cursor and no
//! backtracking:
//!
//! ```text
//! [structure] dH(0K) dH(298K) [exact | ± value] [units] [mass [± value]] … CAS*rank
//! ```
//!
//! Each slot decoder looks at the tokens from the cursor onward and returns a
//! [`Step`]: the value it recovered (if any) and how many tokens it consumed.
//! Only the CAS slot breaks the pattern: it always reads the *last* token of
//! the stream.

use super::cas::split_cas_and_relative;
use super::tokenizer::PLUS_MINUS;
use crate::numeric::{is_number, parse_number};
use crate::record::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_GLUED_UNCERTAINTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"±\s*([-+]?\d+(?:\.\d+)?)").unwrap());

static RE_UNITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]+/mol$").unwrap());

/// How the uncertainty slot was filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UncertaintyKind {
    Exact,
    Numeric,
}

/// A recovered uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uncertainty {
    /// The value is exact by definition (no number follows).
    Exact,
    Numeric(f64),
}

impl Uncertainty {
    pub fn kind(&self) -> UncertaintyKind {
        match self {
            Uncertainty::Exact => UncertaintyKind::Exact,
            Uncertainty::Numeric(_) => UncertaintyKind::Numeric,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Uncertainty::Exact => None,
            Uncertainty::Numeric(v) => Some(*v),
        }
    }
}

/// Result of decoding one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<T> {
    pub value: Option<T>,
    pub consumed: usize,
}

impl<T> Step<T> {
    fn skip() -> Self {
        Step {
            value: None,
            consumed: 0,
        }
    }

    fn take(value: Option<T>, consumed: usize) -> Self {
        Step { value, consumed }
    }
}

/// Everything decoded from one record's token stream, before it is reduced to
/// the output schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedEntry {
    pub structure: Option<String>,
    pub enthalpy_0k: Option<f64>,
    pub enthalpy_298k: Option<f64>,
    pub uncertainty: Option<Uncertainty>,
    /// Units token such as `kJ/mol`. Parsed but not part of [`Record`].
    pub units: Option<String>,
    pub molecular_mass: Option<f64>,
    pub molecular_mass_uncertainty: Option<f64>,
    pub cas_rn: Option<String>,
    pub relative_rank: Option<i64>,
}

impl DecodedEntry {
    pub fn uncertainty_kind(&self) -> Option<UncertaintyKind> {
        self.uncertainty.map(|u| u.kind())
    }

    pub fn uncertainty_value(&self) -> Option<f64> {
        self.uncertainty.and_then(|u| u.value())
    }

    /// Reduce to the shared schema under the given species name.
    pub fn into_record(self, common_name: Option<String>) -> Record {
        Record {
            common_name,
            structure: self.structure,
            enthalpy_of_formation_0k: self.enthalpy_0k,
            enthalpy_of_formation_298k: self.enthalpy_298k,
            uncertainty_value: self.uncertainty.and_then(|u| u.value()),
            molecular_mass: self.molecular_mass,
            molecular_mass_uncertainty: self.molecular_mass_uncertainty,
            cas_rn: self.cas_rn,
            relative_rank: self.relative_rank,
            ..Record::default()
        }
    }
}

/// Cursor over the token stream.
struct Cursor<'a> {
    tokens: &'a [String],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a [String] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    fn apply<T>(&mut self, step: Step<T>) -> Option<T> {
        self.pos += step.consumed;
        step.value
    }

    fn has_more(&self) -> bool {
        self.pos < self.tokens.len()
    }
}

/// Decode a token stream. Returns `None` for an empty stream.
pub fn decode_tokens(tokens: &[String]) -> Option<DecodedEntry> {
    if tokens.is_empty() {
        return None;
    }
    let mut cur = Cursor { tokens, pos: 0 };
    let mut entry = DecodedEntry {
        structure: cur.apply(decode_structure(cur.rest())),
        ..DecodedEntry::default()
    };
    entry.enthalpy_0k = cur.apply(decode_number(cur.rest()));
    entry.enthalpy_298k = cur.apply(decode_number(cur.rest()));
    entry.uncertainty = cur.apply(decode_uncertainty(cur.rest()));
    if entry.uncertainty_kind() != Some(UncertaintyKind::Exact) {
        entry.units = cur.apply(decode_units(cur.rest()));
    }
    let mass = decode_number(cur.rest());
    let mass_present = mass.consumed > 0;
    entry.molecular_mass = cur.apply(mass);
    if mass_present {
        entry.molecular_mass_uncertainty = cur
            .apply(decode_uncertainty_marker(cur.rest()))
            .and_then(|u| u.value());
    }
    if cur.has_more() {
        let (cas, rank) = decode_cas(tokens);
        entry.cas_rn = cas;
        entry.relative_rank = rank;
    }
    Some(entry)
}

/// A leading non-numeric token is the structure.
pub fn decode_structure(rest: &[String]) -> Step<String> {
    match rest.first() {
        Some(tok) if !is_number(tok) => Step::take(Some(tok.clone()), 1),
        _ => Step::skip(),
    }
}

/// Consume one token as a number; a non-numeric token is still consumed.
pub fn decode_number(rest: &[String]) -> Step<f64> {
    match rest.first() {
        Some(tok) => Step::take(parse_number(tok), 1),
        None => Step::skip(),
    }
}

/// `exact`, or an uncertainty marker (see [`decode_uncertainty_marker`]).
pub fn decode_uncertainty(rest: &[String]) -> Step<Uncertainty> {
    match rest.first() {
        Some(tok) if tok.eq_ignore_ascii_case("exact") => Step::take(Some(Uncertainty::Exact), 1),
        _ => decode_uncertainty_marker(rest),
    }
}

/// `± value` as two tokens, or `±value` glued into one.
///
/// A lone glyph followed by a non-number consumes only the glyph. A glued
/// token is consumed whether or not a number can be read out of it.
pub fn decode_uncertainty_marker(rest: &[String]) -> Step<Uncertainty> {
    let Some(tok) = rest.first() else {
        return Step::skip();
    };
    if tok == PLUS_MINUS {
        return match rest.get(1).and_then(|t| parse_number(t)) {
            Some(v) => Step::take(Some(Uncertainty::Numeric(v)), 2),
            None => Step::take(None, 1),
        };
    }
    if tok.starts_with(PLUS_MINUS) {
        let value = RE_GLUED_UNCERTAINTY
            .captures(tok)
            .and_then(|caps| parse_number(&caps[1]))
            .map(Uncertainty::Numeric);
        return Step::take(value, 1);
    }
    Step::skip()
}

/// A `letters/mol` units token.
pub fn decode_units(rest: &[String]) -> Step<String> {
    match rest.first() {
        Some(tok) if RE_UNITS.is_match(tok) => Step::take(Some(tok.clone()), 1),
        _ => Step::skip(),
    }
}

/// CAS number and relative rank from the last token, which must contain `*`.
pub fn decode_cas(tokens: &[String]) -> (Option<String>, Option<i64>) {
    match tokens.last() {
        Some(last) if last.contains('*') => split_cas_and_relative(last),
        _ => (None, None),
    }
}
