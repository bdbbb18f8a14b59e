//! Table-finder settings for the cascade, expressed as pdfplumber
//! [`TableSettings`], and conversion of found tables to text rows.
//!
//! Whole-document flavors use pdfplumber's defaults: `Lattice` for ruled
//! tables, `Stream` for whitespace-aligned ones. The per-page layouts run with
//! the configured tolerances:
//!
//! | Layout        | Columns from   | Rows from      | pdfplumber strategy |
//! |---------------|----------------|----------------|---------------------|
//! | `lines/lines` | rulings        | rulings        | `Lattice`           |
//! | `lines/text`  | rulings        | text lines     | `Explicit`: drawn edges plus one rule between consecutive text lines |
//! | `text/text`   | word alignment | word alignment | `Stream`            |
//!
//! Coordinates are PDF points, top-down, as pdfplumber reports them.

use super::cascade::Flavor;
use super::normalize::clean_fragment;
use crate::config::ExtractionConfig;
use pdfplumber::{ExplicitLines, Strategy, TableSettings, TextLine};

/// A table as rows of text cells; the first row is the header.
pub type Table = Vec<Vec<String>>;

/// One per-page layout: where column and row boundaries come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    LinesLines,
    LinesText,
    TextText,
}

impl PageLayout {
    pub fn name(self) -> &'static str {
        match self {
            PageLayout::LinesLines => "lines/lines",
            PageLayout::LinesText => "lines/text",
            PageLayout::TextText => "text/text",
        }
    }
}

/// Strictest first.
pub const PAGE_LAYOUTS: [PageLayout; 3] = [
    PageLayout::LinesLines,
    PageLayout::LinesText,
    PageLayout::TextText,
];

/// Gap in points between a text line and the rule drawn above the first line
/// or below the last.
const ROW_RULE_PAD: f64 = 1.0;

/// Tolerances the per-page layouts hand to pdfplumber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTolerances {
    /// Snap, join, intersection and text tolerance along y.
    pub row: f64,
    /// The same along x.
    pub column: f64,
    pub min_words_vertical: usize,
}

impl Default for LayoutTolerances {
    fn default() -> Self {
        Self::from(&ExtractionConfig::default())
    }
}

impl From<&ExtractionConfig> for LayoutTolerances {
    fn from(config: &ExtractionConfig) -> Self {
        Self {
            row: config.row_tolerance,
            column: config.column_tolerance,
            min_words_vertical: config.min_words_vertical,
        }
    }
}

/// pdfplumber settings for a whole-document flavor.
pub fn flavor_settings(flavor: Flavor) -> TableSettings {
    let strategy = match flavor {
        Flavor::Ruled => Strategy::Lattice,
        Flavor::Stream => Strategy::Stream,
    };
    TableSettings {
        strategy,
        ..TableSettings::default()
    }
}

impl LayoutTolerances {
    /// pdfplumber settings for one page layout.
    ///
    /// `lines` are the page's text lines; only `lines/text` reads them.
    pub fn settings(&self, layout: PageLayout, lines: &[TextLine]) -> TableSettings {
        let tuned = TableSettings {
            snap_tolerance: self.column,
            snap_x_tolerance: self.column,
            snap_y_tolerance: self.row,
            join_tolerance: self.column,
            join_x_tolerance: self.column,
            join_y_tolerance: self.row,
            text_tolerance: self.column,
            text_x_tolerance: self.column,
            text_y_tolerance: self.row,
            intersection_tolerance: self.column,
            intersection_x_tolerance: self.column,
            intersection_y_tolerance: self.row,
            min_words_vertical: self.min_words_vertical,
            ..TableSettings::default()
        };
        match layout {
            PageLayout::LinesLines => TableSettings {
                strategy: Strategy::Lattice,
                ..tuned
            },
            PageLayout::LinesText => TableSettings {
                strategy: Strategy::Explicit,
                explicit_lines: Some(ExplicitLines {
                    horizontal_lines: row_rules(lines),
                    vertical_lines: Vec::new(),
                }),
                ..tuned
            },
            PageLayout::TextText => TableSettings {
                strategy: Strategy::Stream,
                ..tuned
            },
        }
    }
}

/// Horizontal rules separating text lines: one above the first line, one
/// midway between each pair of neighbours, one below the last.
pub fn row_rules(lines: &[TextLine]) -> Vec<f64> {
    let mut bands: Vec<(f64, f64)> = lines.iter().map(|l| (l.bbox.top, l.bbox.bottom)).collect();
    bands.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (Some(&(first_top, _)), Some(&(_, last_bottom))) = (bands.first(), bands.last()) else {
        return Vec::new();
    };

    let mut rules = Vec::with_capacity(bands.len() + 1);
    rules.push(first_top - ROW_RULE_PAD);
    rules.extend(bands.windows(2).map(|pair| (pair[0].1 + pair[1].0) / 2.0));
    rules.push(last_bottom + ROW_RULE_PAD);
    rules
}

/// Cell text of a pdfplumber table, row by row.
///
/// Cells are normalised and their whitespace collapsed, so a header wrapped
/// over two lines reads as one. Blank rows above the first filled row are
/// dropped so the header comes first.
pub fn table_rows(found: &pdfplumber::Table) -> Table {
    found
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| cell_text(cell.text.as_deref())).collect::<Vec<_>>())
        .skip_while(|row| row.iter().all(String::is_empty))
        .collect()
}

fn cell_text(raw: Option<&str>) -> String {
    clean_fragment(raw.unwrap_or_default())
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
