//! Error types for the pdfsqueeze library.
//!
//! Every variant of [`CompressError`] is **fatal** to the call that returned
//! it: the conversion stops at the first render, encode or write failure and
//! nothing is retried. The quality-reduction loop is *not* an error path: an
//! unreachable size target is reported as a
//! [`crate::output::CompressionStatus::TargetUnreachable`] report, and only
//! becomes [`CompressError::TargetUnreachable`] when the caller opts in via
//! [`crate::output::CompressionReport::into_result`].
//!
//! The variants group into the categories callers usually branch on:
//!
//! | Category | Variants | Helper |
//! |----------|----------|--------|
//! | Render   | `CorruptPdf`, `PasswordRequired`, `WrongPassword`, `RenderFailed` | [`CompressError::is_render_error`] |
//! | Encode   | `EncodeFailed` | [`CompressError::is_encode_error`] |
//! | Write    | `WriteFailed`, `SerializeFailed` | [`CompressError::is_write_error`] |
//! | Input    | `FileNotFound`, `PermissionDenied`, `NotAPdf`, `InvalidParameter` | |

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfsqueeze library.
#[derive(Debug, Error)]
pub enum CompressError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Render errors ─────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// A page could not be rasterised (1-based page number).
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── Encode errors ─────────────────────────────────────────────────────
    /// A rasterised page could not be JPEG-encoded (1-based page number).
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    // ── Write errors ──────────────────────────────────────────────────────
    /// Could not create, write or rename the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The assembled document could not be serialised.
    #[error("Failed to serialise output PDF: {detail}")]
    SerializeFailed { detail: String },

    // ── Parameter errors ──────────────────────────────────────────────────
    /// Target size, scale or quality is outside its valid domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // ── Size target ───────────────────────────────────────────────────────
    /// Quality reached its floor while the output was still above the target.
    ///
    /// Only produced by [`crate::output::CompressionReport::into_result`].
    #[error(
        "Could not reach target of {target_kb:.2} KB: best achieved was {achieved_kb:.2} KB \
at quality {quality} ('{path}')"
    )]
    TargetUnreachable {
        target_kb: f64,
        achieved_kb: f64,
        quality: u8,
        path: PathBuf,
    },

    // ── Attempt context ───────────────────────────────────────────────────
    /// A fatal error raised while an attempt was running.
    ///
    /// The category helpers look through this wrapper.
    #[error("Attempt {attempt} (quality {quality}) failed: {source}")]
    AttemptFailed {
        attempt: usize,
        quality: u8,
        #[source]
        source: Box<CompressError>,
    },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the executable, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CompressError {
    /// The underlying error, with any [`CompressError::AttemptFailed`] context removed.
    pub fn root(&self) -> &CompressError {
        match self {
            CompressError::AttemptFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// `true` for failures to open or rasterise the source document.
    pub fn is_render_error(&self) -> bool {
        matches!(
            self.root(),
            CompressError::CorruptPdf { .. }
                | CompressError::PasswordRequired { .. }
                | CompressError::WrongPassword { .. }
                | CompressError::RenderFailed { .. }
        )
    }

    /// `true` for JPEG encoding failures.
    pub fn is_encode_error(&self) -> bool {
        matches!(self.root(), CompressError::EncodeFailed { .. })
    }

    /// `true` for failures to produce the output file.
    pub fn is_write_error(&self) -> bool {
        matches!(
            self.root(),
            CompressError::WriteFailed { .. } | CompressError::SerializeFailed { .. }
        )
    }
}
