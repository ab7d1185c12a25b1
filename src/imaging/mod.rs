//! Image transform core: decode, crop, resize, encode.
//!
//! | Step | Crate / function |
//! |---|---|
//! | **Parse** | [`parse_dimensions`], [`parse_crop`] |
//! | **Decode** | `image::ImageReader` (JPEG, PNG, GIF, TIFF, WebP) |
//! | **Crop** | clip to bounds + `crop_imm` |
//! | **Resize** | Catmull-Rom, aspect-preserving when one axis is 0, capped at [`MAX_OUTPUT_SIDE`] / [`MAX_OUTPUT_PIXELS`] |
//! | **Encode** | PNG |
//!
//! The module is split into:
//! - **Parameters**: dimension/crop grammar and the types it produces
//! - **Calculations**: pure geometry (unit testable)
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`transform`] entry points combining validation + backend
//!
//! Nothing here logs or keeps global state; the service and CLI add that
//! on top.

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{ErrorKind, ImageBackend, TransformError};
pub use calculations::{MAX_OUTPUT_PIXELS, MAX_OUTPUT_SIDE};
pub use operations::{transform, transform_with};
pub use params::{CropRect, Dimensions, TransformParams, parse_crop, parse_dimensions};
pub use rust_backend::{OUTPUT_FORMAT, RustBackend};
