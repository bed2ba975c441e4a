//! The size-targeting controller and its public entry points.
//!
//! One **attempt** rasterises every page at the configured scale, encodes
//! each bitmap at the attempt's JPEG quality, assembles a fresh document,
//! writes it over the output path and measures it. The loop is an explicit
//! state machine:
//!
//! ```text
//!            ┌──────────── Retry (quality − 10) ◀──┐
//!            ▼                                     │
//! Rendering ──▶ Measuring ──┬── size ≤ target ──▶ Done
//!                           ├── next quality ≥ 1 ──┘
//!                           └── next quality < 1 ──▶ TargetUnreachable
//! ```
//!
//! Scale and target never change between attempts, so the loop performs at
//! most [`CompressionParameters::max_attempts`] passes. Render, encode and
//! write failures abort the whole call.

use crate::config::{CompressionConfig, CompressionParameters};
use crate::error::CompressError;
use crate::output::{AttemptRecord, CompressionReport, CompressionStatus};
use crate::pipeline::assemble;
use crate::pipeline::encode::{ImageEncoder, JpegEncoder};
use crate::pipeline::input;
use crate::pipeline::render::{self, PageSource, PdfiumSource};
use crate::progress::CompressionProgressCallback;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// What the controller does after measuring an attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Done,
    Retry(CompressionParameters),
    TargetUnreachable,
}

/// Decide the next state from the parameters of the attempt just measured.
///
/// The target is inclusive: a file exactly at the limit is accepted.
pub fn next_transition(params: &CompressionParameters, size_kb: f64) -> Transition {
    if size_kb <= params.target_max_size_kb {
        Transition::Done
    } else {
        match params.next_attempt() {
            Some(next) => Transition::Retry(next),
            None => Transition::TargetUnreachable,
        }
    }
}

/// Run the compression loop over any page source and encoder.
///
/// Parameters are validated before the first page is rendered. On return
/// the output path holds the file written by the last attempt.
pub fn compress_with<S, E>(
    source: &S,
    encoder: &E,
    output_path: impl AsRef<Path>,
    config: &CompressionConfig,
) -> Result<CompressionReport, CompressError>
where
    S: PageSource + ?Sized,
    E: ImageEncoder + ?Sized,
{
    let total_start = Instant::now();
    let output_path = output_path.as_ref();
    let mut params = config.parameters();
    params.validate()?;

    let total_pages = source.page_count();
    let callback = config.progress_callback.as_deref();
    info!(
        "Compressing {} pages → {} (target {:.2} KB, scale {}, quality {})",
        total_pages,
        output_path.display(),
        params.target_max_size_kb,
        params.scale_factor,
        params.quality
    );
    if let Some(cb) = callback {
        cb.on_compression_start(total_pages);
    }

    let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(params.max_attempts());
    let status = loop {
        let attempt = attempts.len() + 1;
        let record = run_attempt(source, encoder, output_path, &params, attempt, callback)
            .map_err(|e| {
                error!("Attempt {} (quality {}) failed: {}", attempt, params.quality, e);
                CompressError::AttemptFailed {
                    attempt,
                    quality: params.quality,
                    source: Box::new(e),
                }
            })?;
        let size_kb = record.size_kb;
        attempts.push(record);

        match next_transition(&params, size_kb) {
            Transition::Done => {
                info!(
                    "Attempt {}: {:.2} KB ≤ {:.2} KB at quality {}",
                    attempt, size_kb, params.target_max_size_kb, params.quality
                );
                break CompressionStatus::Done;
            }
            Transition::Retry(next) => {
                warn!(
                    "Compressed PDF is still larger than {:.2} KB ({:.2} KB at quality {}). \
Retrying with quality {}...",
                    params.target_max_size_kb, size_kb, params.quality, next.quality
                );
                params = next;
            }
            Transition::TargetUnreachable => {
                warn!(
                    "Quality floor reached: {:.2} KB at quality {} is still above {:.2} KB",
                    size_kb, params.quality, params.target_max_size_kb
                );
                break CompressionStatus::TargetUnreachable;
            }
        }
    };

    let final_size_kb = attempts.last().map(|a| a.size_kb).unwrap_or_default();
    let report = CompressionReport {
        output_path: output_path.to_path_buf(),
        status,
        final_size_kb,
        final_quality: params.quality,
        target_max_size_kb: params.target_max_size_kb,
        scale_factor: params.scale_factor,
        page_count: total_pages,
        attempts,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!("{}", report.summary());
    if let Some(cb) = callback {
        cb.on_compression_complete(&report);
    }

    Ok(report)
}

/// One rasterise → encode → assemble → save → measure pass.
///
/// Each bitmap is moved into the encoder and released before the next page
/// is rendered; the encoded pages are consumed by the assembler.
fn run_attempt<S, E>(
    source: &S,
    encoder: &E,
    output_path: &Path,
    params: &CompressionParameters,
    attempt: usize,
    callback: Option<&dyn CompressionProgressCallback>,
) -> Result<AttemptRecord, CompressError>
where
    S: PageSource + ?Sized,
    E: ImageEncoder + ?Sized,
{
    let start = Instant::now();
    let total_pages = source.page_count();
    info!("Attempt {}: quality {}", attempt, params.quality);
    if let Some(cb) = callback {
        cb.on_attempt_start(attempt, params.quality);
    }

    let mut encoded = Vec::with_capacity(total_pages);
    for index in 0..total_pages {
        let raster = source.render_page(index, params.scale_factor)?;
        let image = encoder.encode(raster, params.quality)?;
        if let Some(cb) = callback {
            cb.on_page_encoded(index + 1, total_pages, image.data.len());
        }
        encoded.push(image);
    }

    let mut document = assemble::assemble(encoded);
    assemble::save(&mut document, output_path)?;
    let size_kb = assemble::file_size_kb(output_path)?;

    let duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        "Attempt {}: {} pages, {:.2} KB in {}ms",
        attempt, total_pages, size_kb, duration_ms
    );
    if let Some(cb) = callback {
        cb.on_attempt_complete(attempt, params.quality, size_kb);
    }

    Ok(AttemptRecord {
        attempt,
        quality: params.quality,
        size_kb,
        duration_ms,
    })
}

/// Compress the PDF at `input` into `output` using pdfium and JPEG.
///
/// # Errors
/// - `InvalidParameter` before any I/O when the config is out of range or
///   `output` is the input file itself
/// - input errors (`FileNotFound`, `NotAPdf`, ...) before pdfium is bound
/// - render/encode/write errors from the attempt that hit them, wrapped in
///   [`CompressError::AttemptFailed`]
///
/// An unreachable target is `Ok` with
/// [`CompressionStatus::TargetUnreachable`]; see
/// [`CompressionReport::into_result`].
pub fn compress_sync(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CompressionConfig,
) -> Result<CompressionReport, CompressError> {
    config.validate()?;
    let output_path = output_path.as_ref();
    let input_path = input::resolve_input(input_path)?;
    reject_in_place(&input_path, output_path)?;

    let pdfium = render::bind_pdfium()?;
    let source = PdfiumSource::open(&pdfium, &input_path, config.password.as_deref())?;
    compress_with(&source, &JpegEncoder, output_path, config)
}

/// Async wrapper around [`compress_sync`].
///
/// pdfium is not async-safe and the loop is CPU-bound, so the whole call
/// runs on tokio's blocking pool.
pub async fn compress(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &CompressionConfig,
) -> Result<CompressionReport, CompressError> {
    let input_path = input_path.as_ref().to_path_buf();
    let output_path = output_path.as_ref().to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || compress_sync(&input_path, &output_path, &config))
        .await
        .map_err(|e| CompressError::Internal(format!("Compression task panicked: {}", e)))?
}

/// Compress PDF bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed when this
/// returns.
pub fn compress_from_bytes(
    bytes: &[u8],
    output_path: impl AsRef<Path>,
    config: &CompressionConfig,
) -> Result<CompressionReport, CompressError> {
    config.validate()?;
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| CompressError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| CompressError::Internal(format!("tempfile write: {e}")))?;
    compress_sync(tmp.path(), output_path, config)
}

/// Every attempt overwrites `output`, so it must not be the source.
fn reject_in_place(input: &Path, output: &Path) -> Result<(), CompressError> {
    let same = match (input.canonicalize(), output.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    };
    if same {
        return Err(CompressError::InvalidParameter(format!(
            "output '{}' would overwrite the input file",
            output.display()
        )));
    }
    Ok(())
}
