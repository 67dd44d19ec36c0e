//! Pure Rust JPEG codec — zero external dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode | `image` crate (`ImageReader`, pure Rust JPEG decoder) |
//! | Decode blob | `image::load_from_memory_with_format` |
//! | Encode | `image::codecs::jpeg::JpegEncoder` |
//!
//! The intake is deliberately JPEG-only: that is what cameras produce, what
//! the EXIF splicing in [`crate::exif`] understands, and what the size-capped
//! re-encode targets.

use super::codec::{CodecError, ImageCodec, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageEncoder, ImageFormat, ImageReader, RgbImage};
use std::path::Path;

/// File extensions this codec will decode.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

/// Returns true if the path has a JPEG extension (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Pure Rust codec using the `image` crate.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec for RustCodec {
    fn decode(&self, path: &Path) -> Result<RgbImage, CodecError> {
        let img = ImageReader::open(path)
            .map_err(CodecError::Io)?
            .decode()
            .map_err(|e| {
                CodecError::Decode(format!("failed to decode {}: {}", path.display(), e))
            })?;
        Ok(img.into_rgb8())
    }

    fn decode_bytes(&self, bytes: &[u8]) -> Result<RgbImage, CodecError> {
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
            .map_err(|e| CodecError::Decode(format!("failed to decode blob: {e}")))?;
        Ok(img.into_rgb8())
    }

    fn encode(&self, img: &RgbImage, quality: Quality) -> Result<Vec<u8>, CodecError> {
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.value() as u8)
            .write_image(
                img.as_raw(),
                img.width(),
                img.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
        Ok(bytes)
    }
}
