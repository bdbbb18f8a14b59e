//! PDF loading: open with pdfplumber, keep the selected pages, and render each
//! page's text once.
//!
//! Page text is rebuilt from pdfplumber's words and text lines rather than
//! taken from `extract_text`, which joins every word with a single space. A
//! gap wider than pdfplumber's own column density becomes two spaces, which is
//! the column boundary the text scraper splits on.
//!
//! Tables are found lazily: the cascade usually stops at the first flavor, so
//! the later layouts never run on most documents.

use super::cascade::{Flavor, TableDocument};
use super::layout::{flavor_settings, table_rows, LayoutTolerances, PageLayout, Table};
use super::normalize::clean_page_text;
use crate::config::ExtractionConfig;
use crate::error::{StageError, ThermoError};
use crate::output::PagePreview;
use pdfplumber::{cluster_words_into_lines, Page, Pdf, PdfError, TableSettings, TextLine, TextOptions, WordOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One selected page.
pub struct LoadedPage {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Rendered page text; `None` when the page could not be read.
    pub text: Option<String>,
    lines: Vec<TextLine>,
    page: Option<Page>,
}

impl LoadedPage {
    /// A page known only by its text, with nothing for the table finders.
    pub fn from_text(page_num: usize, text: Option<&str>) -> Self {
        Self {
            page_num,
            text: text.map(str::to_string),
            lines: Vec::new(),
            page: None,
        }
    }

    fn read(page: Page, page_num: usize, row_tolerance: f64) -> Self {
        let words = page.extract_words(&WordOptions::default());
        let lines = cluster_words_into_lines(&words, row_tolerance);
        let text = clean_page_text(&render_lines(&lines, TextOptions::default().x_density));
        debug!("Read page {} → {} words, {} lines", page_num, words.len(), lines.len());
        Self {
            page_num,
            text: Some(text),
            lines,
            page: Some(page),
        }
    }

    fn tables(&self, settings: &TableSettings) -> Vec<Table> {
        let Some(page) = self.page.as_ref() else {
            return Vec::new();
        };
        page.find_tables(settings)
            .iter()
            .map(table_rows)
            .filter(|rows| !rows.is_empty())
            .collect()
    }
}

/// Selected pages of a PDF.
#[derive(Default)]
pub struct LoadedDocument {
    pub path: PathBuf,
    /// Pages in the whole document, selected or not.
    pub total_pages: usize,
    pub pages: Vec<LoadedPage>,
    /// Pages that could not be read.
    pub failures: Vec<StageError>,
    pub tolerances: LayoutTolerances,
}

impl LoadedDocument {
    /// Wrap already-read pages.
    pub fn from_pages(pages: Vec<LoadedPage>, tolerances: LayoutTolerances) -> Self {
        Self {
            total_pages: pages.len(),
            pages,
            tolerances,
            ..Self::default()
        }
    }

    /// First `max_lines` non-blank lines of the first `max_pages` pages.
    pub fn previews(&self, max_pages: usize, max_lines: usize) -> Vec<PagePreview> {
        self.pages
            .iter()
            .take(max_pages)
            .map(|p| PagePreview {
                page_num: p.page_num,
                lines: p
                    .text
                    .as_deref()
                    .unwrap_or_default()
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .take(max_lines)
                    .map(str::to_string)
                    .collect(),
            })
            .collect()
    }
}

impl TableDocument for LoadedDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_tables(&self, flavor: Flavor) -> Result<Vec<Table>, StageError> {
        let settings = flavor_settings(flavor);
        Ok(self.pages.iter().flat_map(|p| p.tables(&settings)).collect())
    }

    fn extract_page_tables(&self, page: usize, layout: PageLayout) -> Result<Vec<Table>, StageError> {
        let loaded = self.pages.get(page).ok_or_else(|| StageError::StrategyFailed {
            strategy: layout.name().into(),
            detail: format!("page index {page} out of range"),
        })?;
        let settings = self.tolerances.settings(layout, &loaded.lines);
        Ok(loaded.tables(&settings))
    }

    fn extract_page_text(&self, page: usize) -> Result<String, StageError> {
        let loaded = self.pages.get(page);
        loaded
            .and_then(|p| p.text.clone())
            .ok_or_else(|| StageError::PageTextFailed {
                page: loaded.map_or(page + 1, |p| p.page_num),
                detail: "text layer unavailable".into(),
            })
    }
}

/// Join each line's words, two spaces across any gap wider than `column_gap`.
pub fn render_lines(lines: &[TextLine], column_gap: f64) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let mut prev_x1 = None;
        for word in &line.words {
            if let Some(x1) = prev_x1 {
                out.push_str(if word.bbox.x0 - x1 > column_gap { "  " } else { " " });
            }
            out.push_str(&word.text);
            prev_x1 = Some(word.bbox.x1);
        }
    }
    out
}

// ── pdfplumber ───────────────────────────────────────────────────────────────

/// Load the pages selected by `config.pages`.
///
/// Blocking; call from `spawn_blocking`.
pub fn load_document_blocking(pdf_path: &Path, config: &ExtractionConfig) -> Result<LoadedDocument, ThermoError> {
    let bytes = std::fs::read(pdf_path).map_err(|source| ThermoError::ReadFailed {
        path: pdf_path.to_path_buf(),
        source,
    })?;
    let pdf = open_pdf(&bytes, pdf_path, config.password.as_deref())?;

    let total_pages = pdf.page_count();
    let selected = config.pages.to_indices(total_pages);
    info!("PDF loaded: {} pages, {} selected", total_pages, selected.len());

    let mut loaded = LoadedDocument {
        path: pdf_path.to_path_buf(),
        total_pages,
        tolerances: LayoutTolerances::from(config),
        ..LoadedDocument::default()
    };

    for idx in selected {
        let page_num = idx + 1;
        match pdf.page(idx) {
            Ok(page) => loaded.pages.push(LoadedPage::read(page, page_num, config.row_tolerance)),
            Err(e) => {
                warn!("Page {}: unreadable: {}", page_num, e);
                loaded.failures.push(StageError::PageTextFailed {
                    page: page_num,
                    detail: e.to_string(),
                });
                loaded.pages.push(LoadedPage::from_text(page_num, None));
            }
        }
    }

    Ok(loaded)
}

fn open_pdf(bytes: &[u8], path: &Path, password: Option<&str>) -> Result<Pdf, ThermoError> {
    let opened = match password {
        Some(pwd) => Pdf::open_with_password(bytes, pwd.as_bytes(), None),
        None => Pdf::open(bytes, None),
    };
    opened.map_err(|e| match e {
        PdfError::PasswordRequired => ThermoError::PasswordRequired {
            path: path.to_path_buf(),
        },
        PdfError::InvalidPassword => ThermoError::WrongPassword {
            path: path.to_path_buf(),
        },
        other => ThermoError::CorruptPdf {
            path: path.to_path_buf(),
            detail: other.to_string(),
        },
    })
}
