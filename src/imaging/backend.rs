//! Image transform backend trait and error taxonomy.
//!
//! The [`ImageBackend`] trait defines the single effectful operation of the
//! core: read an encoded image, optionally crop it, resize it and write the
//! encoded result.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Callers that need to
//! tell failures apart (the HTTP layer maps them to status codes) use
//! [`TransformError::kind`].

use super::params::TransformParams;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Coarse classification of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied a malformed dimension or crop string, or
    /// geometry that cannot produce an image.
    Parameter,
    /// The input bytes are not a supported, valid image.
    Image,
    /// Producing or delivering the output failed.
    Output,
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) | Self::InvalidDimensions(_) => ErrorKind::Parameter,
            Self::Decode(_) => ErrorKind::Image,
            Self::Encode(_) | Self::Write(_) => ErrorKind::Output,
        }
    }
}

/// Trait for image transform backends.
///
/// Implementations hold no per-call state, so one instance can serve any
/// number of concurrent transforms.
pub trait ImageBackend: Send + Sync {
    /// Decode `input`, apply `params`, and write the encoded result to `output`.
    ///
    /// Nothing is written to `output` unless decoding, cropping, resizing and
    /// encoding all succeeded.
    fn transform(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        params: &TransformParams,
    ) -> Result<(), TransformError>;
}
