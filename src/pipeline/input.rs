//! Input resolution for both pipelines.
//!
//! PDF inputs may be a local path or an `http(s)` URL. URLs are downloaded
//! into a `TempDir` that lives as long as the returned [`ResolvedInput`].
//! Local and downloaded files are both checked for the `%PDF` magic bytes so
//! a mislabelled text file fails with a clear error instead of inside the
//! PDF parser.
//!
//! Text inputs for the markdown path are always local and read whole.

use crate::error::ThermoError;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// The resolved input: either a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local(PathBuf),
    /// Input was a URL; the `TempDir` is held so the file outlives processing.
    Downloaded { path: PathBuf, _temp_dir: TempDir },
}

impl ResolvedInput {
    /// Path to the PDF regardless of how it was resolved.
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a PDF input string to a local file path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, ThermoError> {
    if input.trim().is_empty() {
        return Err(ThermoError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input)
    }
}

/// Validate a local PDF: exists, readable, starts with `%PDF`.
fn resolve_local(path_str: &str) -> Result<ResolvedInput, ThermoError> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(ThermoError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != PDF_MAGIC {
                return Err(ThermoError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(ThermoError::PermissionDenied { path });
        }
        Err(_) => return Err(ThermoError::FileNotFound { path }),
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, ThermoError> {
    info!("Downloading PDF from: {}", url);
    let failed = |reason: String| ThermoError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ThermoError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let temp_dir = TempDir::new().map_err(|e| ThermoError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(filename_from_url(url));
    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;

    if bytes.len() >= 4 && &bytes[..4] != PDF_MAGIC {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        return Err(ThermoError::NotAPdf {
            path: file_path,
            magic,
        });
    }

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| ThermoError::Internal(format!("Failed to write temp file: {}", e)))?;
    info!("Downloaded {} bytes to: {}", bytes.len(), file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        _temp_dir: temp_dir,
    })
}

/// Last path segment if it looks like a file name, else `downloaded.pdf`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty() && last.contains('.'))
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}

/// Read a UTF-8 text document, dropping a leading byte-order mark.
pub async fn read_text_input(path: &Path) -> Result<String, ThermoError> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            debug!("Read {} bytes from {}", text.len(), path.display());
            Ok(text.strip_prefix('\u{FEFF}').map(str::to_string).unwrap_or(text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ThermoError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(ThermoError::PermissionDenied {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(ThermoError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }),
    }
}
