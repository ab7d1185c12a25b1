//! Parameter types and the dimension-string grammar.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between callers (the HTTP handler and the CLI, which receive
//! strings) and the [`backend`](super::backend), which does the pixel work.
//!
//! ## Grammar
//!
//! ```text
//! dimensions := W | W "x" H            e.g. "16", "16x16"
//! crop       := X0 "x" Y0 "," X1 "x" Y1  e.g. "0x0,32x32"
//! ```
//!
//! All components are base-10 non-negative integers. A missing or zero
//! height means "derive from the aspect ratio"; see
//! [`calculations::target_dimensions`](super::calculations::target_dimensions).
//!
//! Components after the second in a dimension string are ignored, so
//! `16x16x9` reads as `16x16`. Crop points are strict: exactly two
//! integers each.

use super::backend::TransformError;
use std::fmt;
use std::str::FromStr;

const DIMENSIONS_HINT: &str = "expected W or WxH, e.g. 16x16";
const CROP_HINT: &str = "expected X0xY0,X1xY1, e.g. 0x0,32x32";

/// Requested output size. Zero on one axis means "preserve aspect ratio".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dimensions(s)
    }
}

/// Axis-aligned crop rectangle in source pixel coordinates.
///
/// `(x0, y0)` is the top-left corner (inclusive), `(x1, y1)` the bottom-right
/// corner (exclusive). Corners are canonicalised on construction, so
/// `CropRect::new(60, 60, 10, 10)` is the same region as
/// `CropRect::new(10, 10, 60, 60)`. A rectangle built as a struct literal
/// may hold inverted corners; [`width`](Self::width), [`height`](Self::height)
/// and the backend treat it as its canonical form. Bounds against the actual
/// image are not known here; the backend clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CropRect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Same region with `x0 <= x1` and `y0 <= y1`.
    pub fn canonical(&self) -> Self {
        Self::new(self.x0, self.y0, self.x1, self.y1)
    }

    pub fn width(&self) -> u32 {
        self.x0.abs_diff(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y0.abs_diff(self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{},{}x{}", self.x0, self.y0, self.x1, self.y1)
    }
}

impl FromStr for CropRect {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_crop(s)
    }
}

/// Everything a backend needs to know besides the byte streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformParams {
    pub crop: Option<CropRect>,
    pub size: Dimensions,
}

fn parse_component(token: &str, input: &str, hint: &str) -> Result<u32, TransformError> {
    token
        .parse::<u32>()
        .map_err(|_| TransformError::InvalidFormat(format!("{input:?}: {hint}")))
}

/// Parse a `W` or `WxH` dimension string.
///
/// A missing height comes back as `0`.
pub fn parse_dimensions(s: &str) -> Result<Dimensions, TransformError> {
    let mut tokens = s.split('x');
    let width = match tokens.next() {
        Some(token) => parse_component(token, s, DIMENSIONS_HINT)?,
        None => {
            return Err(TransformError::InvalidFormat(format!(
                "{s:?}: {DIMENSIONS_HINT}"
            )));
        }
    };
    let height = match tokens.next() {
        Some(token) => parse_component(token, s, DIMENSIONS_HINT)?,
        None => 0,
    };
    Ok(Dimensions { width, height })
}

/// Parse one `XxY` crop corner; both components are required.
fn parse_point(point: &str, input: &str) -> Result<(u32, u32), TransformError> {
    let tokens: Vec<&str> = point.split('x').collect();
    if tokens.len() != 2 {
        return Err(TransformError::InvalidFormat(format!("{input:?}: {CROP_HINT}")));
    }
    Ok((
        parse_component(tokens[0], input, CROP_HINT)?,
        parse_component(tokens[1], input, CROP_HINT)?,
    ))
}

/// Parse an `X0xY0,X1xY1` crop string into a rectangle.
pub fn parse_crop(s: &str) -> Result<CropRect, TransformError> {
    let points: Vec<&str> = s.split(',').collect();
    if points.len() != 2 {
        return Err(TransformError::InvalidFormat(format!("{s:?}: {CROP_HINT}")));
    }
    let (x0, y0) = parse_point(points[0], s)?;
    let (x1, y1) = parse_point(points[1], s)?;
    Ok(CropRect::new(x0, y0, x1, y1))
}
