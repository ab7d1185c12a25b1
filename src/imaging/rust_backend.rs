//! Pure Rust transform backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader` with magic-byte format detection |
//! | Crop | `image::DynamicImage::crop_imm` on the clipped rectangle |
//! | Resize | `image::DynamicImage::resize_exact` with `CatmullRom` |
//! | Encode → PNG | `image::DynamicImage::write_to` into a memory buffer |
//!
//! The encoded image is buffered in full before the first byte reaches the
//! output sink, so a failed transform never leaves a partial image behind.

use super::backend::{ImageBackend, TransformError};
use super::calculations::{clip_crop, target_dimensions};
use super::params::TransformParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{Cursor, Read, Write};

/// Formats whose decoders are compiled in.
const INPUT_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::Tiff,
    ImageFormat::WebP,
];

/// Output is always PNG.
pub const OUTPUT_FORMAT: ImageFormat = ImageFormat::Png;

/// Returns the input formats that have working decoders compiled in.
pub fn supported_input_formats() -> Vec<ImageFormat> {
    INPUT_FORMATS
        .iter()
        .copied()
        .filter(|fmt| fmt.reading_enabled())
        .collect()
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-step mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Read and decode an image from an arbitrary byte stream.
fn decode(input: &mut dyn Read) -> Result<DynamicImage, TransformError> {
    let mut bytes = Vec::new();
    input
        .read_to_end(&mut bytes)
        .map_err(|e| TransformError::Decode(format!("Failed to read input: {e}")))?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| TransformError::Decode(format!("Failed to sniff input: {e}")))?;

    match reader.format() {
        Some(fmt) if supported_input_formats().contains(&fmt) => {}
        Some(fmt) => {
            return Err(TransformError::Decode(format!(
                "Unsupported input format: {fmt:?}"
            )));
        }
        None => return Err(TransformError::Decode("Unrecognized image data".into())),
    }

    reader
        .decode()
        .map_err(|e| TransformError::Decode(e.to_string()))
}

/// Encode to PNG in memory.
fn encode(img: &DynamicImage) -> Result<Vec<u8>, TransformError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), OUTPUT_FORMAT)
        .map_err(|e| TransformError::Encode(format!("PNG encode failed: {e}")))?;
    Ok(buf)
}

impl ImageBackend for RustBackend {
    fn transform(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &TransformParams,
    ) -> Result<(), TransformError> {
        let mut img = decode(input)?;

        if let Some(crop) = params.crop {
            let rect = clip_crop(crop, (img.width(), img.height()))?;
            img = img.crop_imm(rect.x0, rect.y0, rect.width(), rect.height());
        }

        let (width, height) = target_dimensions((img.width(), img.height()), params.size)?;
        let resized = img.resize_exact(width, height, FilterType::CatmullRom);

        let encoded = encode(&resized)?;
        output.write_all(&encoded)?;
        output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::ErrorKind;
    use crate::imaging::params::{CropRect, Dimensions};
    use crate::test_helpers::{decode_png, jpeg_bytes, png_bytes, quadrant_png};

    fn run(input: &[u8], crop: Option<CropRect>, size: Dimensions) -> Result<Vec<u8>, TransformError> {
        let mut out = Vec::new();
        RustBackend::new().transform(&mut &input[..], &mut out, &TransformParams { crop, size })?;
        Ok(out)
    }

    #[test]
    fn supported_formats_include_png_and_jpeg() {
        let formats = supported_input_formats();
        assert!(formats.contains(&ImageFormat::Png));
        assert!(formats.contains(&ImageFormat::Jpeg));
    }

    #[test]
    fn resize_png_to_exact_size() {
        let out = run(&png_bytes(100, 100), None, Dimensions::new(50, 25)).unwrap();
        let img = decode_png(&out);
        assert_eq!((img.width(), img.height()), (50, 25));
    }

    #[test]
    fn resize_jpeg_input_emits_png() {
        let out = run(&jpeg_bytes(200, 150), None, Dimensions::new(100, 0)).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        let img = decode_png(&out);
        assert_eq!((img.width(), img.height()), (100, 75));
    }

    #[test]
    fn upscaling_is_allowed() {
        let out = run(&png_bytes(10, 10), None, Dimensions::new(0, 40)).unwrap();
        let img = decode_png(&out);
        assert_eq!((img.width(), img.height()), (40, 40));
    }

    #[test]
    fn crop_selects_the_requested_region() {
        // Top-left quadrant is red; crop inside it and the result stays red.
        let input = quadrant_png(100, 100);
        let out = run(
            &input,
            Some(CropRect::new(5, 5, 45, 45)),
            Dimensions::new(8, 8),
        )
        .unwrap();
        let img = decode_png(&out).to_rgb8();
        assert_eq!(img.dimensions(), (8, 8));
        for px in img.pixels() {
            assert!(px[0] >= 250 && px[1] <= 5 && px[2] <= 5, "{px:?}");
        }
    }

    #[test]
    fn crop_overhanging_the_image_is_clipped() {
        let out = run(
            &png_bytes(100, 100),
            Some(CropRect::new(50, 50, 500, 500)),
            Dimensions::new(10, 0),
        )
        .unwrap();
        // clipped to 50x50, so aspect stays square
        let img = decode_png(&out);
        assert_eq!((img.width(), img.height()), (10, 10));
    }

    #[test]
    fn crop_outside_the_image_fails_without_output() {
        let mut out = Vec::new();
        let err = RustBackend::new()
            .transform(
                &mut &png_bytes(20, 20)[..],
                &mut out,
                &TransformParams {
                    crop: Some(CropRect::new(30, 30, 40, 40)),
                    size: Dimensions::new(10, 10),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert!(out.is_empty());
    }

    #[test]
    fn inverted_struct_literal_crop_matches_canonical() {
        let input = quadrant_png(100, 100);
        let inverted = CropRect {
            x0: 60,
            y0: 60,
            x1: 10,
            y1: 10,
        };
        let a = run(&input, Some(inverted), Dimensions::new(10, 10)).unwrap();
        let b = run(&input, Some(CropRect::new(10, 10, 60, 60)), Dimensions::new(10, 10)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn derived_size_over_limit_fails_without_output() {
        // 1x10000 source, 10000 wide → 100_000_000 tall
        let mut out = Vec::new();
        let err = RustBackend::new()
            .transform(
                &mut &png_bytes(1, 10_000)[..],
                &mut out,
                &TransformParams {
                    crop: None,
                    size: Dimensions::new(10_000, 0),
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidDimensions(_)), "{err}");
        assert_eq!(err.kind(), ErrorKind::Parameter);
        assert!(out.is_empty());
    }

    #[test]
    fn truncated_input_is_decode_error() {
        let png = png_bytes(64, 64);
        let mut out = Vec::new();
        let err = RustBackend::new()
            .transform(
                &mut &png[..png.len() / 2],
                &mut out,
                &TransformParams {
                    crop: None,
                    size: Dimensions::new(10, 10),
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::Decode(_)), "{err}");
        assert!(out.is_empty());
    }

    #[test]
    fn garbage_input_is_decode_error() {
        let err = run(b"definitely not an image", None, Dimensions::new(10, 10)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Image);
    }

    #[test]
    fn output_is_deterministic() {
        let input = quadrant_png(64, 48);
        let a = run(&input, Some(CropRect::new(4, 4, 40, 40)), Dimensions::new(20, 0)).unwrap();
        let b = run(&input, Some(CropRect::new(4, 4, 40, 40)), Dimensions::new(20, 0)).unwrap();
        assert_eq!(a, b);
    }

    struct ClosedSink;

    impl Write for ClosedSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "connection closed",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_output_error() {
        let err = RustBackend::new()
            .transform(
                &mut &png_bytes(16, 16)[..],
                &mut ClosedSink,
                &TransformParams {
                    crop: None,
                    size: Dimensions::new(8, 8),
                },
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::Write(_)));
        assert_eq!(err.kind(), ErrorKind::Output);
    }
}
