use super::{FetchError, FetchResult, ObjectStore, StoredObject, join_url};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Serves originals from a directory tree. Handy for development and tests.
pub struct LocalStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalStore {
    pub fn new(root: PathBuf, public_base_url: Option<String>) -> Self {
        debug!("Initializing local store rooted at {}", root.display());
        Self {
            root,
            public_base_url,
        }
    }

    /// Resolve a key inside the root, refusing directory traversal.
    fn resolve(&self, key: &str) -> FetchResult<PathBuf> {
        let clean = key.trim_start_matches('/');
        if clean.is_empty() {
            return Err(FetchError::InvalidKey("empty key".to_string()));
        }
        if clean.split(['/', '\\']).any(|part| part == "..") {
            return Err(FetchError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(clean))
    }
}

/// Quoted SHA-256 prefix of the object bytes, in HTTP entity-tag form.
fn etag_for(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    format!("\"{}\"", &digest[..32])
}

/// `If-None-Match` may hold `*` or a comma-separated list of tags.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || candidate.trim_start_matches("W/") == etag)
}

fn content_type_for(path: &Path) -> Option<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    let mime = match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => "application/octet-stream",
    };
    Some(mime.to_string())
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn fetch(&self, key: &str, if_none_match: Option<&str>) -> FetchResult<StoredObject> {
        let path = self.resolve(key)?;
        debug!("Reading local object {}", path.display());

        let body = fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(key.to_string()),
            _ => FetchError::Backend(format!("Failed to read {}: {e}", path.display())),
        })?;

        let etag = etag_for(&body);
        if if_none_match.is_some_and(|inm| etag_matches(inm, &etag)) {
            return Err(FetchError::NotModified);
        }

        Ok(StoredObject {
            content_type: content_type_for(&path),
            etag: Some(etag),
            body,
        })
    }

    fn public_url(&self, key: &str) -> Option<String> {
        self.public_base_url
            .as_deref()
            .map(|base| join_url(base, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_with(files: &[(&str, &[u8])]) -> (tempfile::TempDir, LocalStore) {
        let tmp = tempdir().unwrap();
        for (name, bytes) in files {
            let path = tmp.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, bytes).unwrap();
        }
        let store = LocalStore::new(tmp.path().to_path_buf(), None);
        (tmp, store)
    }

    #[tokio::test]
    async fn fetch_returns_bytes_type_and_etag() {
        let (_tmp, store) = store_with(&[("nested/cat.png", b"png bytes")]);
        let object = store.fetch("nested/cat.png", None).await.unwrap();
        assert_eq!(object.body, b"png bytes");
        assert_eq!(object.content_type.as_deref(), Some("image/png"));
        let etag = object.etag.unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag.len(), 34);
    }

    #[tokio::test]
    async fn fetch_missing_is_not_found() {
        let (_tmp, store) = store_with(&[]);
        let result = store.fetch("absent.jpg", None).await;
        assert!(matches!(result, Err(FetchError::NotFound(k)) if k == "absent.jpg"));
    }

    #[tokio::test]
    async fn fetch_rejects_traversal() {
        let (_tmp, store) = store_with(&[("a.png", b"x")]);
        for key in ["../etc/passwd", "a/../../b", ""] {
            let result = store.fetch(key, None).await;
            assert!(
                matches!(result, Err(FetchError::InvalidKey(_))),
                "expected InvalidKey for {key:?}"
            );
        }
    }

    #[tokio::test]
    async fn matching_if_none_match_is_not_modified() {
        let (_tmp, store) = store_with(&[("a.png", b"x")]);
        let etag = store.fetch("a.png", None).await.unwrap().etag.unwrap();

        let result = store.fetch("a.png", Some(&etag)).await;
        assert!(matches!(result, Err(FetchError::NotModified)));

        let list = format!("\"stale\", {etag}");
        let result = store.fetch("a.png", Some(&list)).await;
        assert!(matches!(result, Err(FetchError::NotModified)));

        let result = store.fetch("a.png", Some("\"stale\"")).await;
        assert!(result.is_ok());
    }

    #[test]
    fn public_url_only_when_configured() {
        let store = LocalStore::new(PathBuf::from("/srv"), None);
        assert!(store.public_url("a.png").is_none());

        let store = LocalStore::new(
            PathBuf::from("/srv"),
            Some("https://cdn.example.com/img/".into()),
        );
        assert_eq!(
            store.public_url("a.png").as_deref(),
            Some("https://cdn.example.com/img/a.png")
        );
    }

    #[test]
    fn content_type_falls_back_to_octet_stream() {
        assert_eq!(
            content_type_for(Path::new("a.JPG")).as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            content_type_for(Path::new("a")).as_deref(),
            Some("application/octet-stream")
        );
    }
}
