//! Extraction entry points.
//!
//! Every function here returns `Ok` as soon as the input could be opened:
//! a document that yields no records is a successful run with an empty
//! `records` list and diagnostics explaining why. Only [`ThermoError`]s
//! (missing file, not a PDF, missing password, unwritable output) surface
//! as `Err`.

use crate::config::{ExtractionConfig, PageSelection};
use crate::error::ThermoError;
use crate::markdown;
use crate::output::{ExtractionOutput, PagePreview};
use crate::pipeline::{cascade, input, load};
use crate::record::Record;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default number of pages shown by [`inspect`].
pub const PREVIEW_PAGES: usize = 3;

/// Default number of lines per page shown by [`inspect`].
pub const PREVIEW_LINES: usize = 10;

// ── PDF path ─────────────────────────────────────────────────────────────────

/// Extract records from a PDF file or URL.
///
/// # Arguments
/// * `input_str`: Local file path or HTTP/HTTPS URL to a PDF
/// * `config`: Extraction configuration
///
/// # Errors
/// Returns `Err(ThermoError)` only for fatal errors:
/// - File not found / permission denied / download failed
/// - Not a valid PDF, corrupt PDF, password problems
pub async fn extract_pdf(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ThermoError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting PDF extraction: {}", input_str);

    // ── Step 1: Resolve input ────────────────────────────────────────────
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();

    // ── Step 2: Load pages and run the cascade off the async workers ─────
    let task_config = config.clone();
    let mut output = tokio::task::spawn_blocking(move || {
        let doc = load::load_document_blocking(&pdf_path, &task_config)?;
        if doc.pages.is_empty() {
            warn!(
                "Page selection {:?} matched none of {} pages",
                task_config.pages, doc.total_pages
            );
        }
        let mut output = cascade::extract_from_document(&doc, &task_config);
        let mut failures = doc.failures;
        failures.append(&mut output.failures);
        output.failures = failures;
        Ok::<_, ThermoError>(output)
    })
    .await
    .map_err(|e| ThermoError::Internal(format!("Extraction task panicked: {}", e)))??;

    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "PDF extraction complete: {} records, {}ms total",
        output.records.len(),
        output.stats.total_duration_ms
    );
    Ok(output)
}

/// Extract records from a PDF and write them as JSON to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn extract_pdf_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ThermoError> {
    let output = extract_pdf(input_str, config).await?;
    write_records(output_path.as_ref(), &output.records).await?;
    Ok(output)
}

/// Extract records from PDF bytes held in memory.
///
/// The bytes are written to a managed temp file that is removed on return.
pub async fn extract_pdf_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ThermoError> {
    let mut tmp = tempfile::NamedTempFile::new()
        .map_err(|e| ThermoError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| ThermoError::Internal(format!("tempfile write: {e}")))?;
    let path = tmp.path().to_string_lossy().to_string();
    extract_pdf(&path, config).await
}

/// Synchronous wrapper around [`extract_pdf`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_pdf_sync(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ThermoError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ThermoError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract_pdf(input_str, config))
}

/// First `max_lines` non-blank lines of each of the first `max_pages` pages.
///
/// Ignores `config.pages`; only the password is used.
pub async fn inspect(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
    max_pages: usize,
    max_lines: usize,
) -> Result<Vec<PagePreview>, ThermoError> {
    let resolved = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let pdf_path = resolved.path().to_path_buf();
    if max_pages == 0 {
        return Ok(Vec::new());
    }

    let mut task_config = config.clone();
    task_config.pages = PageSelection::Range(1, max_pages);
    tokio::task::spawn_blocking(move || {
        let doc = load::load_document_blocking(&pdf_path, &task_config)?;
        Ok::<_, ThermoError>(doc.previews(max_pages, max_lines))
    })
    .await
    .map_err(|e| ThermoError::Internal(format!("Inspect task panicked: {}", e)))?
}

// ── Markdown path ────────────────────────────────────────────────────────────

/// Extract records from a semi-structured text (markdown) table.
pub async fn extract_markdown(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ThermoError> {
    let total_start = Instant::now();
    let path = path.as_ref();
    info!("Starting markdown extraction: {}", path.display());

    let text = input::read_text_input(path).await?;
    let mut output = markdown::parse_document(&text, config);
    output.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    Ok(output)
}

/// Extract records from a text table and write them as JSON to `output_path`.
pub async fn extract_markdown_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ThermoError> {
    let output = extract_markdown(path, config).await?;
    write_records(output_path.as_ref(), &output.records).await?;
    Ok(output)
}

// ── JSON output ──────────────────────────────────────────────────────────────

/// Pretty-printed JSON array (2-space indent, non-ASCII kept literal).
pub fn records_to_json(records: &[Record]) -> Result<String, ThermoError> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Write records to `path` atomically.
pub async fn write_records(path: &Path, records: &[Record]) -> Result<(), ThermoError> {
    let json = records_to_json(records)?;
    let write_failed = |source| ThermoError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    let written = match tokio::fs::write(&tmp_path, json.as_bytes()).await {
        Ok(()) => tokio::fs::rename(&tmp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            debug!("Could not remove {}: {}", tmp_path.display(), cleanup);
        }
        return Err(write_failed(e));
    }
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Load records previously written by [`write_records`].
pub async fn read_records(path: &Path) -> Result<Vec<Record>, ThermoError> {
    let text = input::read_text_input(path).await?;
    Ok(serde_json::from_str(&text)?)
}
