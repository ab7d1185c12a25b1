//! High-level transform entry points.
//!
//! These functions validate caller geometry and hand the streams to a
//! backend. They hold no state, so any number may run concurrently.

use super::backend::{ImageBackend, TransformError};
use super::calculations::validate_requested;
use super::params::{CropRect, Dimensions, TransformParams};
use super::rust_backend::RustBackend;
use std::io::{Read, Write};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Decode `input`, optionally crop, resize to `size`, and write PNG to `output`.
///
/// Uses the default [`RustBackend`].
pub fn transform(
    input: impl Read,
    output: impl Write,
    crop: Option<CropRect>,
    size: Dimensions,
) -> Result<()> {
    transform_with(&RustBackend::new(), input, output, crop, size)
}

/// Same as [`transform`], driving an explicit backend.
///
/// A `0x0` size, or an explicit size over the output limits, is rejected
/// before any input is read.
pub fn transform_with(
    backend: &dyn ImageBackend,
    mut input: impl Read,
    mut output: impl Write,
    crop: Option<CropRect>,
    size: Dimensions,
) -> Result<()> {
    validate_requested(size)?;
    backend.transform(&mut input, &mut output, &TransformParams { crop, size })
}
