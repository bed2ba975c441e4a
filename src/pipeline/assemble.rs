//! Output assembly: one encoded image per page, written to disk, measured.
//!
//! Each page is exactly the size of its image (1 pixel = 1 PDF unit) and
//! draws the image to fill the whole MediaBox. JPEG bytes are embedded as-is
//! under `/DCTDecode`; only the tiny content streams are Flate-compressed.
//!
//! A fresh document is built for every attempt. Saving goes through a
//! sibling `.tmp` file and a rename, so the output path always holds either
//! the previous attempt's file or the new one, never a torn write.

use crate::error::CompressError;
use crate::pipeline::encode::EncodedImage;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use tracing::debug;

const PRODUCER: &str = concat!("pdfsqueeze ", env!("CARGO_PKG_VERSION"));

/// Build an image-only document with one page per entry of `images`, in order.
///
/// The JPEG payloads are moved into the document, not copied.
pub fn assemble(images: Vec<EncodedImage>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(images.len());

    for img in images {
        let (w, h) = (img.width as i64, img.height as i64);

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w,
                "Height" => h,
                "ColorSpace" => img.color.pdf_color_space(),
                "BitsPerComponent" => 8i64,
                "Filter" => "DCTDecode",
            },
            img.data,
        )
        .with_compression(false);
        let image_id = doc.add_object(image_stream);

        let content = format!("q {w} 0 0 {h} 0 0 cm /Im0 Do Q");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0i64.into(), 0i64.into(), w.into(), h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal(PRODUCER),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    doc.compress();
    doc
}

/// Serialise `doc` and atomically replace whatever is at `path`.
pub fn save(doc: &mut Document, path: &Path) -> Result<(), CompressError> {
    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| CompressError::SerializeFailed {
            detail: e.to_string(),
        })?;

    let write_failed = |source: std::io::Error| CompressError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let tmp_path = tmp_path_for(path);
    let written = std::fs::write(&tmp_path, &buf).and_then(|()| std::fs::rename(&tmp_path, path));
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(write_failed(e));
    }

    debug!("Wrote {} bytes to {}", buf.len(), path.display());
    Ok(())
}

/// Size of the file at `path` in KB (1 KB = 1024 bytes).
pub fn file_size_kb(path: &Path) -> Result<f64, CompressError> {
    let meta = std::fs::metadata(path).map_err(|source| CompressError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(meta.len() as f64 / 1024.0)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".tmp");
    PathBuf::from(s)
}
