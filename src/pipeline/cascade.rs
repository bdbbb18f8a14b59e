//! The table cascade: ordered strategies, first non-empty result wins, text
//! scraping as the last resort.
//!
//! ```text
//! ruled ──empty──▶ stream ──empty──▶ page_layout ──┐
//!   │                │                  │          │
//!   └──── tables ────┴──── tables ──────┘          │
//!               │                                  │
//!         rows_to_records ──no records──▶ text_scrape
//! ```
//!
//! Every failure below the document handle is absorbed here: a strategy that
//! errors counts as "no tables", a page whose text cannot be read is skipped,
//! a malformed row is dropped. Each stage appends one diagnostic line.

use super::columns::rows_to_records;
use super::layout::{PageLayout, Table, PAGE_LAYOUTS};
use crate::config::ExtractionConfig;
use crate::error::StageError;
use crate::numeric::safe_float;
use crate::output::{ExtractionOutput, SourceKind};
use crate::record::Record;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

/// Whole-document table extraction flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Tables drawn with a visible grid.
    Ruled,
    /// Tables laid out by whitespace alone.
    Stream,
}

/// What the cascade needs from a loaded document.
///
/// `page` arguments index the selected pages, `0..page_count()`.
pub trait TableDocument {
    fn page_count(&self) -> usize;

    /// Tables of every page under one flavor, in page order.
    fn extract_tables(&self, flavor: Flavor) -> Result<Vec<Table>, StageError>;

    /// Tables of one page under one layout.
    fn extract_page_tables(&self, page: usize, layout: PageLayout) -> Result<Vec<Table>, StageError>;

    /// Plain text of one page.
    fn extract_page_text(&self, page: usize) -> Result<String, StageError>;
}

type Strategy = fn(&dyn TableDocument, &mut Vec<StageError>) -> Result<Vec<Table>, StageError>;

/// `(name, diagnostic key, strategy)` in priority order.
const STRATEGIES: [(&str, &str, Strategy); 3] = [
    ("ruled", "ruled_tables", ruled),
    ("stream", "stream_tables", stream),
    ("page_layout", "layout_tables", page_layout),
];

fn ruled(doc: &dyn TableDocument, _: &mut Vec<StageError>) -> Result<Vec<Table>, StageError> {
    doc.extract_tables(Flavor::Ruled)
}

fn stream(doc: &dyn TableDocument, _: &mut Vec<StageError>) -> Result<Vec<Table>, StageError> {
    doc.extract_tables(Flavor::Stream)
}

/// Per page, the first layout that finds anything. A layout that errors on a
/// page is noted and the next one is tried.
fn page_layout(doc: &dyn TableDocument, failures: &mut Vec<StageError>) -> Result<Vec<Table>, StageError> {
    let mut tables = Vec::new();
    for page in 0..doc.page_count() {
        for layout in PAGE_LAYOUTS {
            match doc.extract_page_tables(page, layout) {
                Ok(found) if !found.is_empty() => {
                    debug!(page, layout = layout.name(), tables = found.len(), "layout matched");
                    tables.extend(found);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Layout '{}' failed on page index {}: {}", layout.name(), page, e);
                    failures.push(StageError::StrategyFailed {
                        strategy: layout.name().to_string(),
                        detail: e.to_string(),
                    });
                }
            }
        }
    }
    Ok(tables)
}

/// Run the full cascade over a document.
pub fn extract_from_document(doc: &dyn TableDocument, config: &ExtractionConfig) -> ExtractionOutput {
    let mut out = ExtractionOutput::new(SourceKind::Pdf);
    let cb = config.progress_callback.as_deref();
    let pages = doc.page_count();
    out.stats.units_scanned = pages;
    if let Some(cb) = cb {
        cb.on_extraction_start(pages);
    }

    // ── Table strategies ─────────────────────────────────────────────────
    let mut tables = Vec::new();
    for (name, key, strategy) in STRATEGIES {
        if let Some(cb) = cb {
            cb.on_strategy_start(name);
        }
        let found = match strategy(doc, &mut out.failures) {
            Ok(found) => found,
            Err(e) => {
                warn!("Strategy '{}' failed: {}", name, e);
                if let Some(cb) = cb {
                    cb.on_strategy_error(name, &e.to_string());
                }
                out.failures.push(StageError::StrategyFailed {
                    strategy: name.to_string(),
                    detail: e.to_string(),
                });
                Vec::new()
            }
        };
        info!("Strategy '{}' found {} tables", name, found.len());
        if let Some(cb) = cb {
            cb.on_strategy_complete(name, found.len());
        }
        out.note(format!("{key}={}", found.len()));
        if !found.is_empty() {
            out.stats.strategy = Some(name.to_string());
            tables = found;
            break;
        }
    }
    out.stats.tables_found = tables.len();

    // ── Rows to records ──────────────────────────────────────────────────
    for (i, table) in tables.iter().enumerate() {
        let mapped = rows_to_records(table, i);
        out.records.extend(mapped.records);
        out.failures.extend(mapped.skipped);
    }
    out.stats.skipped = out
        .failures
        .iter()
        .filter(|f| matches!(f, StageError::RowSkipped { .. }))
        .count();
    out.note(format!("records_after_tables={}", out.records.len()));

    // ── Text scrape ──────────────────────────────────────────────────────
    if out.records.is_empty() {
        if config.text_scrape_fallback {
            scrape_document(doc, config, &mut out);
        } else {
            out.note("text_scrape_skipped");
        }
    }

    out.stats.records = out.records.len();
    info!("Recovered {} records", out.records.len());
    if let Some(cb) = cb {
        cb.on_extraction_complete(out.records.len());
    }
    out
}

fn scrape_document(doc: &dyn TableDocument, config: &ExtractionConfig, out: &mut ExtractionOutput) {
    let cb = config.progress_callback.as_deref();
    if let Some(cb) = cb {
        cb.on_strategy_start("text_scrape");
    }
    let mut failed_pages = 0usize;
    for page in 0..doc.page_count() {
        match doc.extract_page_text(page) {
            Ok(text) => out.records.extend(scrape_text(&text, config.min_scrape_segments)),
            Err(e) => {
                warn!("Text scrape skipped page index {}: {}", page, e);
                failed_pages += 1;
                out.failures.push(e);
            }
        }
    }
    out.stats.text_scraped = !out.records.is_empty();
    out.note(format!("records_after_text_scrape={}", out.records.len()));
    if failed_pages > 0 {
        out.note(format!("text_scrape_failed_pages={failed_pages}"));
        if let Some(cb) = cb {
            cb.on_strategy_error("text_scrape", &format!("{failed_pages} pages unreadable"));
        }
    }
    if let Some(cb) = cb {
        cb.on_strategy_complete("text_scrape", out.records.len());
    }
}

// ── Text scraping ────────────────────────────────────────────────────────────

static RE_COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Scrape every non-blank line of a page's text.
pub fn scrape_text(text: &str, min_segments: usize) -> Vec<Record> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| scrape_line(l, min_segments))
        .collect()
}

/// Read one line as `structure  number  number  number`.
///
/// The line is split on runs of two or more whitespace characters and needs at
/// least `min_segments` segments. Numeric segments after the first fill
/// enthalpy, entropy and Gibbs energy in that order; at least one is required.
pub fn scrape_line(line: &str, min_segments: usize) -> Option<Record> {
    let parts: Vec<&str> = RE_COLUMN_GAP.split(line.trim()).collect();
    if parts.len() < min_segments {
        return None;
    }
    let mut nums = parts[1..].iter().filter_map(|p| safe_float(p));
    let enthalpy = nums.next()?;
    Some(Record {
        structure: Some(parts[0].to_string()),
        enthalpy_of_formation_298k: Some(enthalpy),
        entropy_298k: nums.next(),
        gibbs_free_energy_298k: nums.next(),
        ..Record::default()
    })
}
