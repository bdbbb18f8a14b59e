//! Result types returned by the extraction entry points.

use crate::error::StageError;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Which pipeline produced an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Pdf,
    Markdown,
}

/// Everything a run recovered, plus why it recovered what it did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Records in source document order.
    pub records: Vec<Record>,
    /// Ordered, human-readable progress notes (e.g. `ruled_tables=0`).
    pub diagnostics: Vec<String>,
    /// Non-fatal failures that were absorbed along the way.
    pub failures: Vec<StageError>,
    pub stats: ExtractionStats,
}

impl ExtractionOutput {
    pub fn new(source: SourceKind) -> Self {
        Self {
            stats: ExtractionStats {
                source,
                ..ExtractionStats::default()
            },
            ..Self::default()
        }
    }

    /// Append a diagnostic line.
    pub fn note(&mut self, line: impl Into<String>) {
        self.diagnostics.push(line.into());
    }

    /// Diagnostics joined the way the CLI prints them.
    pub fn diagnostics_line(&self) -> String {
        self.diagnostics.join("; ")
    }
}

/// Summary counters for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub source: SourceKind,
    /// Pages examined (PDF) or lines scanned (markdown).
    pub units_scanned: usize,
    /// Tables produced by the winning strategy.
    pub tables_found: usize,
    /// Name of the strategy whose tables were used, if any.
    pub strategy: Option<String>,
    /// Whether records came from the text scraper.
    pub text_scraped: bool,
    pub records: usize,
    /// Rows (PDF) or record groups (markdown) that produced no record.
    pub skipped: usize,
    pub total_duration_ms: u64,
}

/// First non-blank lines of a page, for eyeballing a document's layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePreview {
    /// 1-indexed page number.
    pub page_num: usize,
    pub lines: Vec<String>,
}
