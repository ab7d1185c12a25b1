use super::{FetchError, FetchResult, ObjectStore, StoredObject, join_url};
use crate::config::StorageConfig;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use tracing::{debug, error};

pub struct S3Store {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        debug!("Initializing S3 store for bucket '{}'", bucket);
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Build a client from the ambient AWS environment (credentials chain,
    /// profile) with the configured region and optional custom endpoint.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let public_base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| default_public_base(&config.region, &config.bucket));

        Self::new(
            Client::from_conf(builder.build()),
            config.bucket.clone(),
            public_base_url,
        )
    }
}

/// Path-style URL of the bucket, e.g. `https://s3-us-west-2.amazonaws.com/photos`.
fn default_public_base(region: &str, bucket: &str) -> String {
    format!("https://s3-{region}.amazonaws.com/{bucket}")
}

/// Map an SDK failure onto the store's error kinds.
fn classify(err: &SdkError<GetObjectError, HttpResponse>, key: &str) -> FetchError {
    if let Some(raw) = err.raw_response() {
        match raw.status().as_u16() {
            304 => return FetchError::NotModified,
            404 => return FetchError::NotFound(key.to_string()),
            _ => {}
        }
    }
    if err
        .as_service_error()
        .is_some_and(|service| service.is_no_such_key())
    {
        return FetchError::NotFound(key.to_string());
    }

    error!("S3 get_object failed for {}: {}", key, DisplayErrorContext(err));
    FetchError::Backend(format!("S3 get_object failed: {}", DisplayErrorContext(err)))
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn fetch(&self, key: &str, if_none_match: Option<&str>) -> FetchResult<StoredObject> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(FetchError::InvalidKey("empty key".to_string()));
        }

        debug!(
            "Fetching object from S3: bucket={}, key={}, if_none_match={:?}",
            self.bucket, key, if_none_match
        );

        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .set_if_none_match(if_none_match.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify(&e, key))?;

        let content_type = output.content_type().map(str::to_string);
        let etag = output.e_tag().map(str::to_string);
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| {
                error!("Failed to read S3 object body: {}", e);
                FetchError::Backend(format!("Failed to read S3 body: {e}"))
            })?
            .into_bytes()
            .to_vec();

        debug!("Fetched object from S3: {} bytes, etag: {:?}", body.len(), etag);
        Ok(StoredObject {
            body,
            content_type,
            etag,
        })
    }

    fn public_url(&self, key: &str) -> Option<String> {
        Some(join_url(&self.public_base_url, key))
    }
}
