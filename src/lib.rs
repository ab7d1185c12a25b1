//! # Waltz
//!
//! An on-demand image resizing proxy. Originals live in an object store;
//! clients ask for `/image/<key>?resize=WxH` and get back a PNG of that size.
//! The same pipeline is available as a one-shot CLI filter
//! (`waltz resize --resize=16x16 < in.jpg > out.png`).
//!
//! # Architecture
//!
//! ```text
//! "16x16", "0x0,32x32"  ──parse──▶  Dimensions, CropRect
//!                                          │
//! encoded bytes  ──decode──▶ crop ──▶ resize ──▶ encode ──▶  PNG bytes
//! ```
//!
//! The [`imaging`] core is synchronous, stateless and free of I/O policy: it
//! reads from any `Read`, writes to any `Write`, and reports failures through
//! a small error taxonomy the callers classify. Everything else (object
//! store access, HTTP status mapping, caching headers, logging, process
//! lifecycle) lives in the collaborators around it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension grammar and the decode → crop → resize → encode pipeline |
//! | [`store`] | `ObjectStore` trait with S3 and local-directory adapters |
//! | [`server`] | axum router, handlers, status mapping, graceful shutdown |
//! | [`config`] | `waltz.toml` loading, merging over stock defaults, validation |
//!
//! # Design Decisions
//!
//! ## PNG-Only Output
//!
//! Output is always PNG regardless of the input format. It is lossless, so
//! resizing never compounds compression artefacts, and the PNG encoder is
//! deterministic: the same request always produces the same bytes, which
//! keeps the original object's ETag meaningful for the resized response.
//!
//! ## Buffer, Then Write
//!
//! The pipeline encodes into memory and only then writes to the output sink.
//! A decode or encode failure therefore never leaves a half-written image on
//! stdout or in an HTTP body, and the HTTP layer can still pick a status
//! code after the transform has run.
//!
//! ## No Ambient State
//!
//! Bucket, region, client handle and cache policy are fields of
//! [`server::AppState`], built once in `main` and shared behind an `Arc`.
//! Nothing in the crate reads process-wide mutable configuration, so
//! concurrent requests cannot interfere with each other.

pub mod config;
pub mod imaging;
pub mod server;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
