//! Header matching and row-to-record mapping for extracted tables.
//!
//! The header row is matched cell by cell against synonym rules; for every
//! semantic field the first matching column wins. A table without a formula
//! column carries no usable records and is rejected whole.

use super::layout::Table;
use crate::error::StageError;
use crate::numeric::safe_float;
use crate::record::{Phase, Record};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, trim and collapse whitespace runs to single spaces.
pub fn normalize_header(cell: &str) -> String {
    RE_WHITESPACE
        .replace_all(cell.trim(), " ")
        .to_lowercase()
}

/// Column index of each semantic field, when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub formula: Option<usize>,
    pub state: Option<usize>,
    pub enthalpy: Option<usize>,
    pub entropy: Option<usize>,
    pub gibbs: Option<usize>,
}

impl ColumnMap {
    /// Match a header row.
    pub fn detect<S: AsRef<str>>(header: &[S]) -> Self {
        let mut map = ColumnMap::default();
        for (i, cell) in header.iter().enumerate() {
            let h = normalize_header(cell.as_ref());
            claim(&mut map.formula, i, h.contains("formula") || h == "species" || h == "name");
            claim(&mut map.state, i, h.contains("state"));
            claim(&mut map.enthalpy, i, h.contains("enthalpy"));
            claim(&mut map.entropy, i, h.contains("entropy"));
            claim(&mut map.gibbs, i, h.contains("gibbs") || h.contains("free energy"));
        }
        map
    }

    /// A table is usable only with a formula column.
    pub fn is_usable(&self) -> bool {
        self.formula.is_some()
    }
}

fn claim(slot: &mut Option<usize>, index: usize, matched: bool) {
    if slot.is_none() && matched {
        *slot = Some(index);
    }
}

/// Records recovered from one table, plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct TableRecords {
    pub records: Vec<Record>,
    pub skipped: Vec<StageError>,
}

/// Map the data rows of `table` (header first) to records.
///
/// Blank rows are ignored silently. A row with no cell at the formula index is
/// malformed and reported in [`TableRecords::skipped`]; other missing cells
/// only leave their field absent.
pub fn rows_to_records(table: &Table, table_index: usize) -> TableRecords {
    let mut out = TableRecords::default();
    let Some((header, rows)) = table.split_first() else {
        return out;
    };
    let cols = ColumnMap::detect(header);
    let Some(formula_col) = cols.formula else {
        debug!(table = table_index, "no formula column; table rejected");
        return out;
    };

    for (i, row) in rows.iter().enumerate() {
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        match map_row(row, formula_col, &cols) {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                debug!(table = table_index, row = i + 1, %reason, "row skipped");
                out.skipped.push(StageError::RowSkipped {
                    table: table_index,
                    row: i + 1,
                    reason,
                });
            }
        }
    }
    out
}

fn map_row(row: &[String], formula_col: usize, cols: &ColumnMap) -> Result<Record, String> {
    let formula = row
        .get(formula_col)
        .ok_or_else(|| format!("no cell at formula column {formula_col} (row has {})", row.len()))?;
    let cell = |col: Option<usize>| col.and_then(|c| row.get(c)).map(String::as_str);

    let structure = formula.trim();
    Ok(Record {
        structure: (!structure.is_empty()).then(|| structure.to_string()),
        enthalpy_of_formation_298k: cell(cols.enthalpy).and_then(safe_float),
        entropy_298k: cell(cols.entropy).and_then(safe_float),
        gibbs_free_energy_298k: cell(cols.gibbs).and_then(safe_float),
        phase: cell(cols.state).and_then(Phase::from_state),
        ..Record::default()
    })
}
