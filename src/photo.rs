//! Lossy photo compression for the profile picture.
//!
//! Photos are kept as JPEG bytes, never as decoded pixels. Decoding
//! always produces a fresh image which only approximates what was
//! compressed.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GenericImageView};

use crate::{Result, TrailError};

/// Compress `image` as JPEG.
///
/// `quality` uses a 0 to 1 scale and is clamped into it;
/// the alpha channel, if any, is dropped. Images without pixels
/// are refused since their JPEG could never be decoded again.
pub fn compress(image: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(TrailError::Encode(format!(
            "empty {}x{} image",
            width, height
        )));
    }
    let quality = jpeg_quality(quality);
    let rgb = image.to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;

    log::debug!(
        "compressed {}x{} photo into {} bytes at quality {}",
        rgb.width(),
        rgb.height(),
        bytes.len(),
        quality
    );
    Ok(bytes)
}

/// Decode stored photo bytes, guessing the format from their content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Read a photo picked from the local file system.
pub fn open<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    log::debug!("opening photo {}", path.as_ref().display());
    Ok(image::open(path)?)
}

fn jpeg_quality(quality: f32) -> u8 {
    let quality = if quality.is_nan() {
        1.0
    } else {
        quality.clamp(0.0, 1.0)
    };
    ((quality * 100.0).round() as u8).max(1)
}
