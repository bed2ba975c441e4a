//! # pdfsqueeze
//!
//! Shrink a PDF below a target file size by rasterising every page and
//! re-encoding it as JPEG, lowering the JPEG quality until the output fits.
//!
//! The result is image-only: text selection, vector content and embedded
//! fonts are not preserved. That is the trade-off that makes scanned and
//! image-heavy documents small enough for upload limits.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     check the path is a readable %PDF file
//!  ├─ 2. Render    rasterise each page via pdfium at `scale_factor`
//!  ├─ 3. Encode    JPEG at the current `quality`
//!  ├─ 4. Assemble  one full-page image per page (lopdf), saved over the output
//!  └─ 5. Measure   ≤ target → done; otherwise quality −10 and go again
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfsqueeze::{compress_sync, CompressionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CompressionConfig::builder()
//!         .target_max_size_kb(500.0)
//!         .build()?;
//!     let report = compress_sync("scan.pdf", "scan_small.pdf", &config)?;
//!     eprintln!("{}", report.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsqueeze` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## PDFium
//!
//! Rendering needs a pdfium shared library at runtime. [`bind_pdfium`] looks
//! at `PDFIUM_LIB_PATH`, then the current directory, then the system search
//! path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod compress;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use compress::{
    compress, compress_from_bytes, compress_sync, compress_with, next_transition, Transition,
};
pub use config::{
    CompressionConfig, CompressionConfigBuilder, CompressionParameters, MAX_QUALITY, MIN_QUALITY,
    QUALITY_STEP,
};
pub use error::CompressError;
pub use output::{AttemptRecord, CompressionReport, CompressionStatus};
pub use pipeline::encode::{ColorComponents, EncodedImage, ImageEncoder, JpegEncoder};
pub use pipeline::input::{default_output_path, ensure_pdf_extension};
pub use pipeline::render::{bind_pdfium, PageSize, PageSource, PdfiumSource, RasterImage};
pub use progress::{CompressionProgressCallback, NoopProgressCallback, ProgressCallback};
