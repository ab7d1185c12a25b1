//! Object store collaborators: where original images come from.
//!
//! The HTTP layer only sees [`ObjectStore`] and the small [`FetchError`]
//! enum. Each adapter translates its own failure modes into that enum, so no
//! SDK error type crosses this boundary.
//!
//! | Adapter | Backing | ETag |
//! |---|---|---|
//! | [`S3Store`] | `aws-sdk-s3` `GetObject` | S3's object ETag |
//! | [`LocalStore`] | a directory on disk | SHA-256 of the file contents |

mod local;
mod s3;

pub use local::LocalStore;
pub use s3::S3Store;

use crate::config::{StorageConfig, StorageKind};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The caller's `If-None-Match` matched the stored object.
    #[error("Not modified")]
    NotModified,

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// An original image and the metadata needed for response headers.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object stored under `key`.
    ///
    /// When `if_none_match` matches the object's current ETag the store
    /// answers [`FetchError::NotModified`] without a body.
    async fn fetch(&self, key: &str, if_none_match: Option<&str>) -> FetchResult<StoredObject>;

    /// Public URL of the unmodified object, if the store has one.
    fn public_url(&self, key: &str) -> Option<String>;
}

/// Join a public base URL and an object key.
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Build the configured store.
pub async fn build_store(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageKind::S3 => Arc::new(S3Store::from_config(config).await),
        StorageKind::Local => Arc::new(LocalStore::new(
            config.root.clone().into(),
            config.public_base_url.clone(),
        )),
    }
}
