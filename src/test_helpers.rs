//! Shared test utilities for the photo-redact test suite.

use image::{ImageEncoder, RgbImage};
use std::path::Path;

/// A small gradient test image — every pixel brighter than pure black, so
/// redacted pixels are distinguishable after a JPEG round trip.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(60 + x % 180) as u8, (60 + y % 180) as u8, 180])
    })
}

/// Encode an image to JPEG bytes at the given quality.
pub fn jpeg_bytes(img: &RgbImage, quality: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    bytes
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(&gradient_image(width, height), 90)).unwrap();
}
