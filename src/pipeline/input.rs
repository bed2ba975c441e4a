//! Input validation: make sure the source path is a readable PDF.
//!
//! We check the `%PDF` magic bytes before handing the path to pdfium so
//! callers get a meaningful error instead of an opaque load failure.

use crate::error::CompressError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn resolve_input(path: impl AsRef<Path>) -> Result<PathBuf, CompressError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(CompressError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(CompressError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(CompressError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(CompressError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Append `.pdf` to `path` unless it already ends with it.
pub fn ensure_pdf_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if is_pdf {
        path.to_path_buf()
    } else {
        let mut s = path.as_os_str().to_os_string();
        s.push(".pdf");
        PathBuf::from(s)
    }
}

/// Default output path: `<dir>/<stem>_compressed.pdf` next to the input.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}_compressed.pdf"))
}
