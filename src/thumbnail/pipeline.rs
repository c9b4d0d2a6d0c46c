//! JPEG thumbnail pipeline.
//!
//! Decodes a source JPEG, rotates it upright according to its EXIF
//! orientation, scales it to a fixed width with a Lanczos filter and
//! re-encodes it as JPEG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::ThumbnailError;

/// Width of every generated thumbnail, in pixels.
pub const THUMBNAIL_WIDTH: u32 = 800;

/// JPEG quality used for thumbnails.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

// =============================================================================
// Thumbnailer
// =============================================================================

/// Stateless decode/resize/encode pipeline.
#[derive(Debug, Clone)]
pub struct Thumbnailer {
    width: u32,
    quality: u8,
}

impl Default for Thumbnailer {
    fn default() -> Self {
        Self::new()
    }
}

impl Thumbnailer {
    /// Create a thumbnailer producing 800px wide images at default quality.
    pub fn new() -> Self {
        Self {
            width: THUMBNAIL_WIDTH,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Turn source JPEG bytes into thumbnail JPEG bytes.
    ///
    /// # Errors
    ///
    /// - [`ThumbnailError::DecodeFailed`] if `source` is not a valid JPEG
    /// - [`ThumbnailError::EncodeFailed`] if the resized image cannot be encoded
    pub fn render(&self, source: &[u8]) -> Result<Vec<u8>, ThumbnailError> {
        let img = decode_upright(source)?;
        let resized = resize_to_width(&img, self.width);
        encode_jpeg(&resized, self.quality)
    }
}

// =============================================================================
// Codec
// =============================================================================

/// Decode a JPEG and apply its EXIF orientation.
pub fn decode_upright(source: &[u8]) -> Result<DynamicImage, ThumbnailError> {
    let reader = ImageReader::with_format(Cursor::new(source), ImageFormat::Jpeg);
    let img = reader
        .decode()
        .map_err(|e| ThumbnailError::DecodeFailed(e.to_string()))?;

    let orientation = read_orientation(source).unwrap_or(1);
    Ok(apply_orientation(img, orientation))
}

/// Read the EXIF orientation tag (1-8), if present.
fn read_orientation(source: &[u8]) -> Option<u32> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(source))
        .ok()?;

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

/// Rotate/flip `img` so that an image stored with `orientation` displays upright.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Encode as baseline JPEG at `quality`.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ThumbnailError> {
    let rgb = img.to_rgb8();
    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, quality);

    encoder
        .encode_image(&rgb)
        .map_err(|e| ThumbnailError::EncodeFailed(e.to_string()))?;

    Ok(output)
}

// =============================================================================
// Resampler
// =============================================================================

/// Height that keeps the aspect ratio when `width x height` is scaled to `target_width`.
///
/// Rounds half-pixels generously (`+ 0.7`) and never returns zero.
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = height as f64 * target_width as f64 / width as f64 + 0.7;
    (scaled as u32).max(1)
}

/// Scale `img` to exactly `target_width` pixels wide using Lanczos3.
pub fn resize_to_width(img: &DynamicImage, target_width: u32) -> DynamicImage {
    let height = scaled_height(img.width(), img.height(), target_width);
    img.resize_exact(target_width, height, FilterType::Lanczos3)
}

// =============================================================================
// Tests
// =============================================================================
