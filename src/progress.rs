//! Progress-callback trait for attempt and page events.
//!
//! Inject an [`Arc<dyn CompressionProgressCallback>`] via
//! [`crate::config::CompressionConfigBuilder::progress_callback`] to follow
//! the retry loop as it runs: one `on_attempt_start` / `on_attempt_complete`
//! pair per quality level tried, with `on_page_encoded` for every page in
//! between.
//!
//! # Example
//!
//! ```rust
//! use pdfsqueeze::{CompressionConfig, CompressionProgressCallback};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl CompressionProgressCallback for Printer {
//!     fn on_attempt_complete(&self, attempt: usize, quality: u8, size_kb: f64) {
//!         eprintln!("attempt {attempt}: quality {quality} -> {size_kb:.1} KB");
//!     }
//! }
//!
//! let config = CompressionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn CompressionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::CompressionReport;
use std::sync::Arc;

/// Called by the controller as it drives the compression loop.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The loop is sequential, but the trait is
/// `Send + Sync` so a callback can be shared with the async entry point.
pub trait CompressionProgressCallback: Send + Sync {
    /// Called once, after the source is opened and before the first attempt.
    fn on_compression_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before an attempt rasterises its first page.
    ///
    /// # Arguments
    /// * `attempt` — 1-indexed attempt number
    /// * `quality` — JPEG quality used for every page of this attempt
    fn on_attempt_start(&self, attempt: usize, quality: u8) {
        let _ = (attempt, quality);
    }

    /// Called after a page has been rasterised and encoded.
    ///
    /// # Arguments
    /// * `page_num`      — 1-indexed page number
    /// * `total_pages`   — pages in the document
    /// * `encoded_bytes` — size of the JPEG stream for this page
    fn on_page_encoded(&self, page_num: usize, total_pages: usize, encoded_bytes: usize) {
        let _ = (page_num, total_pages, encoded_bytes);
    }

    /// Called once the attempt's output file has been written and measured.
    fn on_attempt_complete(&self, attempt: usize, quality: u8, size_kb: f64) {
        let _ = (attempt, quality, size_kb);
    }

    /// Called once when the loop reaches Done or TargetUnreachable.
    ///
    /// Not called when a fatal error aborts the conversion.
    fn on_compression_complete(&self, report: &CompressionReport) {
        let _ = report;
    }
}

/// A no-op implementation, the default when no callback is configured.
pub struct NoopProgressCallback;

impl CompressionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::CompressionConfig`].
pub type ProgressCallback = Arc<dyn CompressionProgressCallback>;
