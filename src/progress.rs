//! Progress-callback trait for cascade events.
//!
//! Inject an [`Arc<dyn ExtractionProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the PDF cascade tries each strategy.
//!
//! # Example
//!
//! ```rust
//! use thermo_extract::{ExtractionConfig, ExtractionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct TableCounter {
//!     tables: Arc<AtomicUsize>,
//! }
//!
//! impl ExtractionProgressCallback for TableCounter {
//!     fn on_strategy_complete(&self, strategy: &str, tables: usize) {
//!         self.tables.fetch_add(tables, Ordering::SeqCst);
//!         eprintln!("{strategy}: {tables} tables");
//!     }
//! }
//!
//! let counter = Arc::new(TableCounter {
//!     tables: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = ExtractionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExtractionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the PDF pipeline as it moves through the cascade.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in cascade order on a single thread,
/// but the trait is `Send + Sync` because the work runs on a blocking pool
/// thread.
pub trait ExtractionProgressCallback: Send + Sync {
    /// Called once after the document is loaded.
    ///
    /// # Arguments
    /// * `total_pages`: number of selected pages that will be examined
    fn on_extraction_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a strategy (`ruled`, `stream`, `page_layout`,
    /// `text_scrape`) runs.
    fn on_strategy_start(&self, strategy: &str) {
        let _ = strategy;
    }

    /// Called when a strategy returns.
    ///
    /// # Arguments
    /// * `strategy`: strategy name
    /// * `found`   : tables found (records, for `text_scrape`)
    fn on_strategy_complete(&self, strategy: &str, found: usize) {
        let _ = (strategy, found);
    }

    /// Called when a strategy failed and the cascade falls through.
    fn on_strategy_error(&self, strategy: &str, error: &str) {
        let _ = (strategy, error);
    }

    /// Called once with the number of records recovered.
    fn on_extraction_complete(&self, records: usize) {
        let _ = records;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ExtractionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ExtractionProgressCallback>;
