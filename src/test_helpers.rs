//! Shared test utilities for the waltz test suite.
//!
//! Synthetic images are generated in memory so tests never depend on
//! fixture files.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let mut out = Vec::new();
//! transform(&png_bytes(100, 100)[..], &mut out, None, Dimensions::new(50, 0))?;
//! assert_eq!(decode_png(&out).width(), 50);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// =========================================================================
// Encoded fixtures
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn encode(img: RgbImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

/// A gradient PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Png)
}

/// A gradient JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(gradient(width, height), ImageFormat::Jpeg)
}

/// A PNG split into four solid quadrants:
/// red (top-left), green (top-right), blue (bottom-left), white (bottom-right).
pub fn quadrant_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        match (x < width / 2, y < height / 2) {
            (true, true) => Rgb([255, 0, 0]),
            (false, true) => Rgb([0, 255, 0]),
            (true, false) => Rgb([0, 0, 255]),
            (false, false) => Rgb([255, 255, 255]),
        }
    });
    encode(img, ImageFormat::Png)
}

// =========================================================================
// Assertions
// =========================================================================

/// Decode transform output, asserting it is a PNG.
pub fn decode_png(bytes: &[u8]) -> DynamicImage {
    assert_eq!(
        image::guess_format(bytes).expect("output should be a known format"),
        ImageFormat::Png,
        "output should be PNG"
    );
    image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap()
}
