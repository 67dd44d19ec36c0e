//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait defines the three operations the export pipeline
//! needs: decode a file, decode an in-memory blob (the embedded thumbnail),
//! and encode a pixel buffer at a given quality.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec) — pure Rust via the `image`
//! crate, statically linked into the binary. Tests use a mock that scripts
//! encode sizes, so the quality-descent search is testable without relying
//! on real JPEG size curves.

use image::RgbImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Pixel extent of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn of(img: &RgbImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
        }
    }
}

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Trait for image decode/encode backends.
///
/// Buffers are interleaved 3-channel RGB ([`RgbImage`]); every decode
/// normalizes to that, and every encode consumes it. The decoded buffer is
/// in *stored* orientation — no EXIF rotation is applied, because regions
/// are defined against the stored pixel grid and the orientation tag is
/// stripped on export anyway.
pub trait ImageCodec: Sync {
    /// Decode an image file into a pixel buffer.
    fn decode(&self, path: &Path) -> Result<RgbImage, CodecError>;

    /// Decode an in-memory JPEG blob (used for embedded thumbnails).
    fn decode_bytes(&self, bytes: &[u8]) -> Result<RgbImage, CodecError>;

    /// Encode a pixel buffer as JPEG at the given quality.
    fn encode(&self, img: &RgbImage, quality: Quality) -> Result<Vec<u8>, CodecError>;
}
