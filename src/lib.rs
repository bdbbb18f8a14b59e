//! # thermo-extract
//!
//! Recover normalized thermochemical records (formula, enthalpy of formation,
//! entropy, Gibbs energy, uncertainty, molecular mass, CAS number) from two
//! kinds of loosely structured sources and emit them as one fixed-schema JSON
//! array.
//!
//! ## Two pipelines, one schema
//!
//! ```text
//! PDF report                              Text / markdown table
//!  │                                        │
//!  ├─ 1. Input    path or URL               ├─ 1. Scan   sentinel / header anchor
//!  ├─ 2. Load     pdfplumber (blocking)     ├─ 2. Group  name line + data up to CAS*rank
//!  ├─ 3. Cascade  ruled → stream → layouts  ├─ 3. Tokenize  whitespace, ± split out
//!  ├─ 4. Columns  fuzzy header matching     └─ 4. Decode slot by slot, one cursor
//!  └─ 5. Scrape   text fallback
//!                      │                     │
//!                      └──────── Record ─────┘
//! ```
//!
//! Both pipelines degrade gracefully: a strategy, page, row or record group
//! that fails is skipped and noted in [`ExtractionOutput::failures`]; a run
//! that recovers nothing still succeeds with an empty record list.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use thermo_extract::{extract_markdown, extract_pdf, records_to_json, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!
//!     let pdf = extract_pdf("thermo_tables.pdf", &config).await?;
//!     eprintln!("{}", pdf.diagnostics_line());
//!
//!     let md = extract_markdown("enthalpy.md", &config).await?;
//!     println!("{}", records_to_json(&md.records)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Output schema
//!
//! Every record serializes with the same twelve keys ([`RECORD_KEYS`]) in the
//! same order. Absent values are the empty string `""`, never a missing key.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `thermo2json` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! thermo-extract = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod markdown;
pub mod numeric;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod record;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, PageSelection};
pub use convert::{
    extract_markdown, extract_markdown_to_file, extract_pdf, extract_pdf_from_bytes,
    extract_pdf_sync, extract_pdf_to_file, inspect, read_records, records_to_json, write_records,
};
pub use error::{StageError, ThermoError};
pub use markdown::{parse_document, parse_record};
pub use numeric::safe_float;
pub use output::{ExtractionOutput, ExtractionStats, PagePreview, SourceKind};
pub use pipeline::cascade::{extract_from_document, Flavor, TableDocument};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use record::{Phase, Record, RECORD_KEYS};
