//! Configuration types for thermochemical record extraction.
//!
//! All run behaviour is controlled through [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. The PDF path reads the page selection,
//! password, layout tolerances and fallback switches; the markdown path reads
//! the scan anchors.

use crate::error::ThermoError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Species name that marks the first record of the markdown source.
pub const DEFAULT_SENTINEL_SPECIES: &str = "Dihydrogen";

/// Header prefix the markdown scan falls back to when the sentinel is absent.
pub const DEFAULT_HEADER_PHRASE: &str = "Species Name";

/// Configuration for an extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use thermo_extract::{ExtractionConfig, PageSelection};
///
/// let config = ExtractionConfig::builder()
///     .pages(PageSelection::Range(2, 9))
///     .row_tolerance(2.5)
///     .text_scrape_fallback(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Pages of the PDF to examine. Default: All pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Species name whose line starts the markdown data section. Default: "Dihydrogen".
    pub sentinel_species: String,

    /// Header prefix used when the sentinel line is missing. Default: "Species Name".
    pub header_phrase: String,

    /// Scrape raw page text when no table yields a record. Default: true.
    pub text_scrape_fallback: bool,

    /// Minimum whitespace-separated segments for a scraped line. Default: 3.
    pub min_scrape_segments: usize,

    /// Vertical tolerance in points for the per-page layouts. Default: 3.0.
    ///
    /// Words whose tops differ by no more than this share a text line; rulings
    /// closer than this snap to one edge.
    pub row_tolerance: f64,

    /// Horizontal tolerance in points for the per-page layouts. Default: 3.0.
    pub column_tolerance: f64,

    /// Words that must line up before their alignment counts as a column
    /// boundary in the `text/text` layout. Default: 3.
    pub min_words_vertical: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional cascade progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pages: PageSelection::default(),
            password: None,
            sentinel_species: DEFAULT_SENTINEL_SPECIES.to_string(),
            header_phrase: DEFAULT_HEADER_PHRASE.to_string(),
            text_scrape_fallback: true,
            min_scrape_segments: 3,
            row_tolerance: 3.0,
            column_tolerance: 3.0,
            min_words_vertical: 3,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("sentinel_species", &self.sentinel_species)
            .field("header_phrase", &self.header_phrase)
            .field("text_scrape_fallback", &self.text_scrape_fallback)
            .field("min_scrape_segments", &self.min_scrape_segments)
            .field("row_tolerance", &self.row_tolerance)
            .field("column_tolerance", &self.column_tolerance)
            .field("min_words_vertical", &self.min_words_vertical)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn sentinel_species(mut self, name: impl Into<String>) -> Self {
        self.config.sentinel_species = name.into();
        self
    }

    pub fn header_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.config.header_phrase = phrase.into();
        self
    }

    pub fn text_scrape_fallback(mut self, enabled: bool) -> Self {
        self.config.text_scrape_fallback = enabled;
        self
    }

    pub fn min_scrape_segments(mut self, n: usize) -> Self {
        self.config.min_scrape_segments = n;
        self
    }

    pub fn row_tolerance(mut self, pt: f64) -> Self {
        self.config.row_tolerance = pt;
        self
    }

    pub fn column_tolerance(mut self, pt: f64) -> Self {
        self.config.column_tolerance = pt;
        self
    }

    pub fn min_words_vertical(mut self, n: usize) -> Self {
        self.config.min_words_vertical = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ThermoError> {
        let c = &self.config;
        if c.min_scrape_segments < 2 {
            return Err(ThermoError::InvalidConfig(format!(
                "min_scrape_segments must be ≥ 2, got {}",
                c.min_scrape_segments
            )));
        }
        if !(c.row_tolerance > 0.0) || !(c.column_tolerance > 0.0) {
            return Err(ThermoError::InvalidConfig(format!(
                "tolerances must be > 0, got row={} column={}",
                c.row_tolerance, c.column_tolerance
            )));
        }
        if c.min_words_vertical == 0 {
            return Err(ThermoError::InvalidConfig(
                "min_words_vertical must be ≥ 1".into(),
            ));
        }
        if c.sentinel_species.trim().is_empty() || c.header_phrase.trim().is_empty() {
            return Err(ThermoError::InvalidConfig(
                "sentinel_species and header_phrase must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF to examine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Every page (default).
    #[default]
    All,
    /// A single page (1-indexed).
    Single(usize),
    /// A contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Whether 1-indexed `page` is selected.
    pub fn contains(&self, page: usize) -> bool {
        match self {
            PageSelection::All => page >= 1,
            PageSelection::Single(p) => page == *p,
            PageSelection::Range(start, end) => (*start..=*end).contains(&page),
            PageSelection::Set(pages) => pages.contains(&page),
        }
    }

    /// Selected pages of a `total_pages` document as sorted 0-indexed positions.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        (1..=total_pages)
            .filter(|&p| self.contains(p))
            .map(|p| p - 1)
            .collect()
    }
}

/// Parses `all`, `7`, `3-15` or a comma list whose items are pages or ranges
/// (`1,4-6,9`).
impl FromStr for PageSelection {
    type Err = ThermoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim().to_lowercase();
        let bad = |why: String| ThermoError::InvalidConfig(format!("page selection '{spec}': {why}"));

        if spec == "all" {
            return Ok(PageSelection::All);
        }
        if spec.is_empty() {
            return Err(bad("name at least one report page, or 'all'".into()));
        }

        let mut pages = Vec::new();
        let mut items = spec.split(',').map(str::trim).peekable();
        while let Some(item) = items.next() {
            let (first, last) = match item.split_once('-') {
                Some((a, b)) => (report_page(a).map_err(&bad)?, report_page(b).map_err(&bad)?),
                None => {
                    let p = report_page(item).map_err(&bad)?;
                    (p, p)
                }
            };
            if first > last {
                return Err(bad(format!("range {first}-{last} runs backwards")));
            }
            let lone = pages.is_empty() && items.peek().is_none();
            if lone {
                return Ok(if first == last {
                    PageSelection::Single(first)
                } else {
                    PageSelection::Range(first, last)
                });
            }
            pages.extend(first..=last);
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Set(pages))
    }
}

/// A 1-indexed report page number.
fn report_page(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("report pages are numbered from 1".into()),
        Ok(p) => Ok(p),
        Err(_) => Err(format!("'{}' is not a page number", s.trim())),
    }
}
