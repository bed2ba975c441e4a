//! Pipeline stages for one compression attempt.
//!
//! Each submodule implements exactly one step so the controller in
//! [`crate::compress`] can run them in a loop and tests can swap the
//! rasteriser or encoder for an in-memory fake.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ assemble ──▶ measure
//! (%PDF)    (pdfium)   (JPEG q)   (lopdf)      (KB on disk)
//! ```
//!
//! 1. [`input`]    — check the source path is a readable PDF
//! 2. [`render`]   — rasterise one page at the configured scale
//! 3. [`encode`]   — JPEG-encode the bitmap at the attempt's quality
//! 4. [`assemble`] — one image per page into a fresh document, saved
//!    atomically over the output path, then measured

pub mod assemble;
pub mod encode;
pub mod input;
pub mod render;
