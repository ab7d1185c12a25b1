//! Service configuration module.
//!
//! Handles loading, merging and validating `waltz.toml`. Stock defaults are
//! the base layer; a user config file (if any) is merged on top, and
//! command-line flags or environment variables override individual values
//! last (see `main.rs`). The resulting [`ServerConfig`] is built once at
//! startup and handed to the router; nothing here is global.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! log_level = "info"          # tracing filter when RUST_LOG is unset
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [storage]
//! backend = "s3"              # "s3" or "local"
//! bucket = ""                 # required for s3
//! region = "us-west-2"
//! # endpoint = "http://localhost:9000"       # S3-compatible services
//! root = "images"             # directory for the local backend
//! # public_base_url = "https://cdn.example.com/images"
//!
//! [cache]
//! max_age_secs = 2592000      # Cache-Control max-age on resized images (30 days)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `waltz.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Default tracing filter, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Listen address.
    pub server: ListenConfig,
    /// Where original images come from.
    pub storage: StorageConfig,
    /// Response caching headers.
    pub cache: CacheConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ListenConfig::default(),
            storage: StorageConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be non-zero".into(),
            ));
        }
        match self.storage.backend {
            StorageKind::S3 => {
                if self.storage.bucket.trim().is_empty() {
                    return Err(ConfigError::Validation(
                        "storage.bucket is required for the s3 backend (or set AWS_BUCKET)".into(),
                    ));
                }
                if self.storage.region.trim().is_empty() {
                    return Err(ConfigError::Validation(
                        "storage.region must not be empty".into(),
                    ));
                }
            }
            StorageKind::Local => {
                if self.storage.root.trim().is_empty() {
                    return Err(ConfigError::Validation(
                        "storage.root is required for the local backend".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Listen address settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListenConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ListenConfig {
    /// `host:port`, ready for `TcpListener::bind`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    S3,
    Local,
}

/// Object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub backend: StorageKind,
    /// S3 bucket holding the originals.
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
    /// Directory holding the originals for the local backend.
    pub root: String,
    /// Redirect target prefix for requests without `resize`.
    /// Defaults to the bucket's S3 URL for the s3 backend.
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::S3,
            bucket: String::new(),
            region: "us-west-2".to_string(),
            endpoint: None,
            root: "images".to_string(),
            public_base_url: None,
        }
    }
}

/// Response caching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// `max-age` for resized responses, in seconds.
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 30 * 24 * 60 * 60,
        }
    }
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ServerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load config from an optional TOML file, merged over stock defaults.
///
/// A missing `path` yields the defaults; a path that does not exist is an
/// error. The result is not validated: CLI and environment overrides are
/// applied first, then the caller runs [`ServerConfig::validate`].
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let overlay: toml::Value = toml::from_str(&content)?;
            merge_toml(base, overlay)
        }
        None => base,
    };
    let config: ServerConfig = merged.try_into()?;
    Ok(config)
}

/// Returns a fully-commented stock `waltz.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Waltz Configuration
# ===================
#
# All options are optional. Values shown are the defaults.
# Command-line flags and environment variables (WALTZ_HOST, PORT, AWS_BUCKET,
# AWS_REGION) override what is set here.

# Tracing filter used when RUST_LOG is not set.
log_level = "info"

[server]
host = "0.0.0.0"
port = 8080

[storage]
# Where originals are fetched from: "s3" or "local".
backend = "s3"
# S3 bucket holding the originals (required for "s3").
bucket = ""
region = "us-west-2"
# Custom endpoint for S3-compatible services (MinIO, R2, ...).
# endpoint = "http://localhost:9000"
# Directory holding the originals for the "local" backend.
root = "images"
# Requests without ?resize= are redirected to <public_base_url>/<key>.
# For "s3" this defaults to https://s3-<region>.amazonaws.com/<bucket>.
# public_base_url = "https://cdn.example.com/images"

[cache]
# Cache-Control max-age on resized images, in seconds (30 days).
max_age_secs = 2592000
"##
}
