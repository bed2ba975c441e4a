//! Image encoding: rasterised page → lossy JPEG bytes.
//!
//! JPEG's output size shrinks as quality drops, which is the property the
//! size-targeting loop relies on. Pages are rendered opaque, so any alpha
//! channel is composited over white and discarded; grayscale bitmaps stay
//! single-channel to keep the stream small.

use crate::config::{MAX_QUALITY, MIN_QUALITY};
use crate::error::CompressError;
use crate::pipeline::render::RasterImage;
use image::{DynamicImage, GrayImage, Luma, LumaA, Rgb, RgbImage, Rgba};
use tracing::debug;

/// Colour model of an encoded image, as declared in the PDF image dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorComponents {
    Gray,
    Rgb,
}

impl ColorComponents {
    pub fn pdf_color_space(&self) -> &'static str {
        match self {
            ColorComponents::Gray => "DeviceGray",
            ColorComponents::Rgb => "DeviceRGB",
        }
    }
}

/// A compressed page image plus the pixel dimensions it represents.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// 0-based page index.
    pub page_index: usize,
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color: ColorComponents,
}

/// Lossy encoder for rasterised pages.
///
/// Takes the raster by value: the bitmap is released once encoding returns.
pub trait ImageEncoder {
    fn encode(&self, raster: RasterImage, quality: u8) -> Result<EncodedImage, CompressError>;
}

/// Baseline JPEG via the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegEncoder;

impl ImageEncoder for JpegEncoder {
    fn encode(&self, raster: RasterImage, quality: u8) -> Result<EncodedImage, CompressError> {
        let page = raster.page_index + 1;
        let fail = |detail: String| CompressError::EncodeFailed { page, detail };

        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(fail(format!(
                "quality must be {MIN_QUALITY}–{MAX_QUALITY}, got {quality}"
            )));
        }
        let (width, height) = (raster.width(), raster.height());
        if width == 0 || height == 0 {
            return Err(fail(format!("empty bitmap ({width}x{height})")));
        }

        let (pixels, color) = match raster.image {
            DynamicImage::ImageLuma8(gray) => (DynamicImage::ImageLuma8(gray), ColorComponents::Gray),
            DynamicImage::ImageLumaA8(gray_alpha) => (
                DynamicImage::ImageLuma8(flatten_gray(&gray_alpha)),
                ColorComponents::Gray,
            ),
            DynamicImage::ImageRgb8(rgb) => (DynamicImage::ImageRgb8(rgb), ColorComponents::Rgb),
            DynamicImage::ImageRgba8(rgba) => (
                DynamicImage::ImageRgb8(flatten_rgba(&rgba)),
                ColorComponents::Rgb,
            ),
            other => {
                return Err(fail(format!(
                    "unsupported pixel format {:?}",
                    other.color()
                )))
            }
        };

        let mut data = Vec::new();
        pixels
            .write_with_encoder(image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut data, quality,
            ))
            .map_err(|e| fail(e.to_string()))?;

        debug!(
            "Encoded page {} ({}x{}, q={}) → {} bytes",
            page,
            width,
            height,
            quality,
            data.len()
        );

        Ok(EncodedImage {
            page_index: raster.page_index,
            data,
            width,
            height,
            color,
        })
    }
}

fn blend_over_white(c: u8, a: u8) -> u8 {
    ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8
}

fn flatten_rgba(img: &image::RgbaImage) -> RgbImage {
    RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let Rgba([r, g, b, a]) = *img.get_pixel(x, y);
        Rgb([
            blend_over_white(r, a),
            blend_over_white(g, a),
            blend_over_white(b, a),
        ])
    })
}

fn flatten_gray(img: &image::GrayAlphaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let LumaA([l, a]) = *img.get_pixel(x, y);
        Luma([blend_over_white(l, a)])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, RgbaImage};

    /// Deterministic noise; JPEG cannot compress it well, so size tracks quality.
    fn noise(width: u32, height: u32) -> RgbImage {
        let mut state: u32 = 0x1234_5678;
        RgbImage::from_fn(width, height, |_, _| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let [r, g, b, _] = state.to_le_bytes();
            Rgb([r, g, b])
        })
    }

    fn raster(image: DynamicImage) -> RasterImage {
        RasterImage {
            page_index: 0,
            image,
        }
    }

    #[test]
    fn lower_quality_is_not_larger() {
        let img = DynamicImage::ImageRgb8(noise(64, 64));
        let sizes: Vec<usize> = [90u8, 50, 10]
            .iter()
            .map(|&q| JpegEncoder.encode(raster(img.clone()), q).unwrap().data.len())
            .collect();
        assert!(sizes[0] >= sizes[1], "sizes: {sizes:?}");
        assert!(sizes[1] >= sizes[2], "sizes: {sizes:?}");
    }

    #[test]
    fn output_is_jpeg_with_matching_dimensions() {
        let encoded = JpegEncoder
            .encode(raster(DynamicImage::ImageRgb8(noise(30, 20))), 75)
            .unwrap();
        assert_eq!(&encoded.data[..2], &[0xFF, 0xD8]);
        assert_eq!((encoded.width, encoded.height), (30, 20));
        assert_eq!(encoded.color, ColorComponents::Rgb);

        let decoded = image::load_from_memory(&encoded.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }

    #[test]
    fn grayscale_stays_single_channel() {
        let gray = GrayImage::from_pixel(8, 8, Luma([128]));
        let encoded = JpegEncoder
            .encode(raster(DynamicImage::ImageLuma8(gray)), 60)
            .unwrap();
        assert_eq!(encoded.color, ColorComponents::Gray);
        assert_eq!(encoded.color.pdf_color_space(), "DeviceGray");
    }

    #[test]
    fn transparent_pixels_become_white() {
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        let flat = flatten_rgba(&rgba);
        assert!(flat.pixels().all(|p| *p == Rgb([255, 255, 255])));

        let opaque = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        assert_eq!(*flatten_rgba(&opaque).get_pixel(0, 0), Rgb([10, 20, 30]));
    }

    #[test]
    fn sixteen_bit_input_is_rejected() {
        let deep: ImageBuffer<Rgb<u16>, Vec<u16>> = ImageBuffer::new(4, 4);
        let err = JpegEncoder
            .encode(raster(DynamicImage::ImageRgb16(deep)), 75)
            .unwrap_err();
        assert!(err.is_encode_error(), "got: {err:?}");
    }

    #[test]
    fn quality_outside_range_is_rejected() {
        let img = DynamicImage::ImageRgb8(noise(4, 4));
        assert!(JpegEncoder.encode(raster(img.clone()), 0).is_err());
        assert!(JpegEncoder.encode(raster(img), 101).is_err());
    }
}
