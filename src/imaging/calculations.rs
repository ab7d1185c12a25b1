//! Pure calculation functions for transform geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::TransformError;
use super::params::{CropRect, Dimensions};

/// Largest output edge, in pixels.
pub const MAX_OUTPUT_SIDE: u32 = 16_384;

/// Largest output area, in pixels (roughly 7000x7000).
pub const MAX_OUTPUT_PIXELS: u64 = 50_000_000;

/// Reject output sizes the resizer could not allocate.
fn check_output_limits(width: u32, height: u32) -> Result<(), TransformError> {
    if width > MAX_OUTPUT_SIDE || height > MAX_OUTPUT_SIDE {
        return Err(TransformError::InvalidDimensions(format!(
            "{width}x{height} exceeds the {MAX_OUTPUT_SIDE}px side limit"
        )));
    }
    if u64::from(width) * u64::from(height) > MAX_OUTPUT_PIXELS {
        return Err(TransformError::InvalidDimensions(format!(
            "{width}x{height} exceeds the {MAX_OUTPUT_PIXELS} pixel limit"
        )));
    }
    Ok(())
}

/// Validate a request before the source size is known.
///
/// Catches `0x0` and any explicitly given axis or area over the output
/// limits. Sizes with a derived axis are checked again in
/// [`target_dimensions`].
pub fn validate_requested(requested: Dimensions) -> Result<(), TransformError> {
    let Dimensions { width, height } = requested;
    if width == 0 && height == 0 {
        return Err(TransformError::InvalidDimensions(
            "width and height cannot both be zero".into(),
        ));
    }
    check_output_limits(width, height)
}

/// Resolve the requested size against the source size.
///
/// A zero on one axis is derived from the other so that the source aspect
/// ratio is preserved, rounded to the nearest pixel and never below 1.
///
/// # Arguments
/// * `source` - Source image dimensions (width, height), after any crop
/// * `requested` - Requested output size, zero meaning "derive"
///
/// # Returns
/// * `(width, height)` - Final output dimensions
///
/// # Errors
/// `InvalidDimensions` when both requested axes are zero, the source has
/// no pixels to scale, or the result exceeds [`MAX_OUTPUT_SIDE`] /
/// [`MAX_OUTPUT_PIXELS`].
pub fn target_dimensions(
    source: (u32, u32),
    requested: Dimensions,
) -> Result<(u32, u32), TransformError> {
    let (src_w, src_h) = source;
    validate_requested(requested)?;
    let Dimensions { width, height } = requested;

    if src_w == 0 || src_h == 0 {
        return Err(TransformError::InvalidDimensions(format!(
            "source image is {src_w}x{src_h}"
        )));
    }

    let derive = |known: u32, num: u32, den: u32| -> u32 {
        let scaled = (known as f64 * num as f64 / den as f64).round();
        scaled.clamp(1.0, u32::MAX as f64) as u32
    };

    let target = match (width, height) {
        (w, 0) => (w, derive(w, src_h, src_w)),
        (0, h) => (derive(h, src_w, src_h), h),
        (w, h) => (w, h),
    };
    check_output_limits(target.0, target.1)?;
    Ok(target)
}

/// Intersect a crop rectangle with the image bounds.
///
/// Returns the clipped, canonical rectangle. A rectangle that lies entirely
/// outside the image, or has zero width or height after clipping, is
/// rejected rather than producing an empty image.
pub fn clip_crop(crop: CropRect, bounds: (u32, u32)) -> Result<CropRect, TransformError> {
    let (img_w, img_h) = bounds;
    let crop = crop.canonical();
    let clipped = CropRect {
        x0: crop.x0.min(img_w),
        y0: crop.y0.min(img_h),
        x1: crop.x1.min(img_w),
        y1: crop.y1.min(img_h),
    };

    if clipped.is_empty() {
        return Err(TransformError::InvalidDimensions(format!(
            "crop {crop} does not overlap the {img_w}x{img_h} image"
        )));
    }
    Ok(clipped)
}
