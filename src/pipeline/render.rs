//! Page rasterisation: render one source page to a bitmap at a fixed scale.
//!
//! The controller only sees the [`PageSource`] trait, so the retry loop can
//! be driven by any renderer. [`PdfiumSource`] is the production
//! implementation on top of `pdfium-render`.
//!
//! A scale of 1.0 renders one pixel per PDF point, so a US-Letter page
//! (612 × 792 pt) at the default scale of 0.5 becomes a 306 × 396 bitmap.

use crate::error::CompressError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Intrinsic page size in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// Pixel dimensions of this page rendered at `scale`.
    ///
    /// Rounded to the nearest pixel, never below 1 × 1.
    pub fn scaled(&self, scale: f32) -> (u32, u32) {
        let px = |points: f32| (points * scale).round().max(1.0) as u32;
        (px(self.width), px(self.height))
    }
}

/// A rendered page. Dropped as soon as it has been encoded.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// 0-based page index.
    pub page_index: usize,
    pub image: DynamicImage,
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A source document that can rasterise its pages.
///
/// Implementations must be deterministic: rendering the same page at the
/// same scale twice yields identical bitmaps.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Intrinsic size of the page at 0-based `index`.
    fn page_size(&self, index: usize) -> Result<PageSize, CompressError>;

    /// Render the page at 0-based `index` scaled uniformly by `scale`.
    ///
    /// Fails with [`CompressError::RenderFailed`] when the page cannot be
    /// decoded.
    fn render_page(&self, index: usize, scale: f32) -> Result<RasterImage, CompressError>;
}

/// Bind to a pdfium shared library.
///
/// Resolution order: `PDFIUM_LIB_PATH` (a directory or the library file
/// itself), the current directory, then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, CompressError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => {
            debug!("Binding pdfium from PDFIUM_LIB_PATH: {}", p);
            if Path::new(&p).is_dir() {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&p))
            } else {
                Pdfium::bind_to_library(p)
            }
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| CompressError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// A PDF opened with pdfium, borrowed from its [`Pdfium`] binding.
pub struct PdfiumSource<'a> {
    document: PdfDocument<'a>,
    path: PathBuf,
}

impl<'a> PdfiumSource<'a> {
    /// Open the PDF at `path`.
    ///
    /// A document pdfium cannot parse is a render-class error.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Self, CompressError> {
        let document = pdfium.load_pdf_from_file(path, password).map_err(|e| {
            let err_str = format!("{:?}", e);
            if err_str.contains("Password") || err_str.contains("password") {
                if password.is_some() {
                    CompressError::WrongPassword {
                        path: path.to_path_buf(),
                    }
                } else {
                    CompressError::PasswordRequired {
                        path: path.to_path_buf(),
                    }
                }
            } else {
                CompressError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: err_str,
                }
            }
        })?;

        info!(
            "PDF loaded: {} ({} pages)",
            path.display(),
            document.pages().len()
        );

        Ok(Self {
            document,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn page(&self, index: usize) -> Result<PdfPage<'a>, CompressError> {
        self.document
            .pages()
            .get(pdfium_page_index(index)?)
            .map_err(|e| CompressError::RenderFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })
    }
}

/// pdfium addresses pages with a `u16`; larger indices are unrenderable.
fn pdfium_page_index(index: usize) -> Result<u16, CompressError> {
    u16::try_from(index).map_err(|_| CompressError::RenderFailed {
        page: index + 1,
        detail: format!("page index {} exceeds pdfium's page range", index),
    })
}

impl PageSource for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> Result<PageSize, CompressError> {
        let page = self.page(index)?;
        Ok(PageSize {
            width: page.width().value,
            height: page.height().value,
        })
    }

    fn render_page(&self, index: usize, scale: f32) -> Result<RasterImage, CompressError> {
        let page = self.page(index)?;
        let (width, height) = PageSize {
            width: page.width().value,
            height: page.height().value,
        }
        .scaled(scale);

        let render_config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| CompressError::RenderFailed {
                page: index + 1,
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            index + 1,
            image.width(),
            image.height()
        );

        Ok(RasterImage {
            page_index: index,
            image,
        })
    }
}
