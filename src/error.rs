//! Error types for the thermo-extract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ThermoError`] is **fatal**: the run cannot proceed at all (input file
//!   missing, not a PDF, encrypted without a password, output not writable). Returned as
//!   `Err(ThermoError)` from the top-level `extract*` functions.
//!
//! * [`StageError`] is **non-fatal**: one strategy, page, row or record group
//!   failed and was skipped. Stored in
//!   [`crate::output::ExtractionOutput::failures`] next to whatever was
//!   recovered; a run that recovers nothing still succeeds.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the thermo-extract library.
#[derive(Debug, Error)]
pub enum ThermoError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A text (markdown) input could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Records could not be encoded as JSON.
    #[error("Failed to serialise records: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Could not create or write the output JSON file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure absorbed at the smallest possible granularity.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum StageError {
    /// A table-extraction strategy threw; the cascade moved on.
    #[error("Strategy '{strategy}' failed: {detail}")]
    StrategyFailed { strategy: String, detail: String },

    /// Text (or layout objects) of one page could not be read.
    #[error("Page {page}: text extraction failed: {detail}")]
    PageTextFailed { page: usize, detail: String },

    /// A table row could not be mapped to a record.
    #[error("Table {table}, row {row}: skipped: {reason}")]
    RowSkipped {
        table: usize,
        row: usize,
        reason: String,
    },

    /// A markdown record group produced no record.
    #[error("Record group '{name}' at line {line}: dropped: {reason}")]
    GroupDropped {
        name: String,
        line: usize,
        reason: String,
    },
}
