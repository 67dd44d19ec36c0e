//! Pixel-level redaction: zero every channel inside a region's bounds.
//!
//! The pixel window for a region is `floor(min) ..= floor(max)` on each
//! axis, clipped to the image extent. Inclusive bounds mean a zero-area
//! region still blacks out one pixel — matching what a click-without-drag
//! gesture has always produced. Writes are plain zeroes, so applying
//! overlapping regions is idempotent and order-independent.

use crate::region::Region;
use image::{Rgb, RgbImage};

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Black out every pixel of `img` inside `region`, clipped to the image.
///
/// A region partially or entirely outside the image is clipped or a no-op,
/// never an error — rescaled regions from a differently-cropped thumbnail
/// routinely land out of bounds.
pub fn apply_region(img: &mut RgbImage, region: &Region) {
    let (width, height) = (img.width() as i64, img.height() as i64);

    let x0 = (region.min_x().floor() as i64).max(0);
    let y0 = (region.min_y().floor() as i64).max(0);
    let x1 = (region.max_x().floor() as i64).min(width - 1);
    let y1 = (region.max_y().floor() as i64).min(height - 1);

    for py in y0..=y1 {
        for px in x0..=x1 {
            img.put_pixel(px as u32, py as u32, BLACK);
        }
    }
}

/// Apply every region in order. Order does not affect the result.
pub fn apply_regions(img: &mut RgbImage, regions: &[Region]) {
    for region in regions {
        apply_region(img, region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn white_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, WHITE)
    }

    fn count_black(img: &RgbImage) -> usize {
        img.pixels().filter(|p| **p == BLACK).count()
    }

    #[test]
    fn blacks_out_inclusive_window() {
        // Spec scenario: 100x100 image, region from corners (10,10)-(30,40).
        let mut img = white_image(100, 100);
        let r = Region::from_corners(10.0, 10.0, 30.0, 40.0);
        assert_eq!((r.x, r.y, r.width, r.height), (10.0, 10.0, 20.0, 30.0));

        apply_region(&mut img, &r);

        // Rows 10-40 and cols 10-30 inclusive are black
        assert_eq!(*img.get_pixel(10, 10), BLACK);
        assert_eq!(*img.get_pixel(30, 40), BLACK);
        assert_eq!(*img.get_pixel(20, 25), BLACK);
        // Just outside on either axis is untouched
        assert_eq!(*img.get_pixel(9, 10), WHITE);
        assert_eq!(*img.get_pixel(10, 41), WHITE);
        assert_eq!(*img.get_pixel(31, 10), WHITE);
        // Exactly (30-10+1) * (40-10+1) pixels changed
        assert_eq!(count_black(&img), 21 * 31);
    }

    #[test]
    fn fractional_bounds_floor() {
        let mut img = white_image(20, 20);
        apply_region(&mut img, &Region::from_corners(2.7, 3.9, 5.1, 4.2));
        // floor bounds: x 2..=5, y 3..=4
        assert_eq!(count_black(&img), 4 * 2);
        assert_eq!(*img.get_pixel(2, 3), BLACK);
        assert_eq!(*img.get_pixel(5, 4), BLACK);
        assert_eq!(*img.get_pixel(6, 3), WHITE);
        assert_eq!(*img.get_pixel(2, 5), WHITE);
    }

    #[test]
    fn zero_area_region_blacks_single_pixel() {
        let mut img = white_image(10, 10);
        apply_region(&mut img, &Region::from_corners(4.5, 4.5, 4.5, 4.5));
        assert_eq!(count_black(&img), 1);
        assert_eq!(*img.get_pixel(4, 4), BLACK);
    }

    #[test]
    fn clips_to_image_extent() {
        let mut img = white_image(10, 10);
        apply_region(&mut img, &Region::from_corners(-5.0, -5.0, 4.0, 4.0));
        assert_eq!(count_black(&img), 5 * 5);
        assert_eq!(*img.get_pixel(0, 0), BLACK);

        let mut img = white_image(10, 10);
        apply_region(&mut img, &Region::from_corners(7.0, 7.0, 50.0, 50.0));
        assert_eq!(count_black(&img), 3 * 3);
        assert_eq!(*img.get_pixel(9, 9), BLACK);
    }

    #[test]
    fn fully_outside_region_is_noop() {
        let mut img = white_image(10, 10);
        apply_region(&mut img, &Region::from_corners(20.0, 20.0, 30.0, 30.0));
        apply_region(&mut img, &Region::from_corners(-30.0, -30.0, -20.0, -20.0));
        assert_eq!(count_black(&img), 0);
    }

    #[test]
    fn overlapping_regions_black_out_union_in_any_order() {
        let a = Region::from_corners(0.0, 0.0, 5.0, 5.0);
        let b = Region::from_corners(3.0, 3.0, 8.0, 8.0);

        let mut ab = white_image(12, 12);
        apply_regions(&mut ab, &[a, b]);

        let mut ba = white_image(12, 12);
        apply_regions(&mut ba, &[b, a]);

        assert_eq!(ab.as_raw(), ba.as_raw());
        // Union: two 6x6 squares overlapping in a 3x3 corner
        assert_eq!(count_black(&ab), 36 + 36 - 9);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let r = Region::from_corners(1.0, 1.0, 4.0, 4.0);
        let mut once = white_image(8, 8);
        apply_region(&mut once, &r);
        let mut twice = white_image(8, 8);
        apply_region(&mut twice, &r);
        apply_region(&mut twice, &r);
        assert_eq!(once.as_raw(), twice.as_raw());
    }
}
