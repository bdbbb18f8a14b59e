//! Pipeline stages for PDF table extraction.
//!
//! Each submodule implements one step. Only [`input`] and [`load`] touch the
//! outside world; the cascade sees a document only through
//! [`cascade::TableDocument`], so it can be tested against a double.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ load ──────────▶ layout ──────────▶ cascade ──▶ columns
//! (URL/path) (pdfplumber,     (finder settings,  (fallbacks)  (rows → records)
//!            normalize text)   cell text)
//! ```
//!
//! 1. [`input`]: canonicalise the user-supplied path or URL to a local file
//! 2. [`load`]: open with pdfplumber and render each selected page's text;
//!    runs in `spawn_blocking` because parsing is CPU-bound
//! 3. [`normalize`]: map typographic minus signs and odd spaces to ASCII
//! 4. [`layout`]: pdfplumber `TableSettings` per flavor and per page layout,
//!    and found tables as rows of cleaned cell text
//! 5. [`cascade`]: ruled → stream → per-page layouts → text scrape
//! 6. [`columns`]: fuzzy header matching and row mapping

pub mod cascade;
pub mod columns;
pub mod input;
pub mod layout;
pub mod load;
pub mod normalize;
