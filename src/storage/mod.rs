//! Object store upload
//!
//! Settings are validated before any client is built, so a missing value
//! never reaches the network.

mod bucket;

pub use bucket::S3Store;

#[cfg(test)]
pub(crate) use tests::MemoryStore;

use std::fs;
use std::path::Path;

use crate::config::S3Settings;
use crate::error::{ExportError, Result};

const DEFAULT_PORT: &str = "443";

/// Blob storage keyed by name
pub trait ObjectStore {
    /// Store `content` under `key`, replacing any existing object
    fn put(&self, key: &str, content: &[u8]) -> Result<()>;

    /// Human readable location of `key`, for the operator
    fn location(&self, key: &str) -> String;
}

/// A fully specified upload destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Target {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

impl S3Target {
    /// Check the four required settings and build the endpoint URL
    pub fn resolve(settings: &S3Settings) -> Result<Self> {
        let missing: Vec<&str> = [
            (crate::config::ENV_S3_ENDPOINT_URL, &settings.endpoint_url),
            (crate::config::ENV_S3_BUCKET_NAME, &settings.bucket_name),
            (crate::config::ENV_S3_ACCESS_KEY, &settings.access_key),
            (crate::config::ENV_S3_SECRET_KEY, &settings.secret_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(|v| v.trim().is_empty()))
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(ExportError::Config(format!(
                "missing S3 settings: {}",
                missing.join(", ")
            )));
        }

        // All four are present past this point
        let value = |v: &Option<String>| v.clone().unwrap_or_default();
        Ok(Self {
            endpoint: normalize_endpoint(&value(&settings.endpoint_url), Some(&settings.port)),
            bucket: value(&settings.bucket_name),
            access_key: value(&settings.access_key),
            secret_key: value(&settings.secret_key),
        })
    }
}

/// Prefix `http://` when no scheme is given; append `:port` unless it is 443
pub fn normalize_endpoint(endpoint: &str, port: Option<&str>) -> String {
    let mut url = endpoint.trim().trim_end_matches('/').to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("http://{}", url);
    }

    match port.map(str::trim) {
        Some(port) if !port.is_empty() && port != DEFAULT_PORT => format!("{}:{}", url, port),
        _ => url,
    }
}

/// Upload the file at `path` under its base file name; returns the key
pub fn upload_file(path: &Path, store: &dyn ObjectStore) -> Result<String> {
    let key = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExportError::Upload(format!("no file name in '{}'", path.display())))?
        .to_string();

    let content = fs::read(path)?;
    store.put(&key, &content)?;

    tracing::info!(key = %key, bytes = content.len(), "uploaded export");
    Ok(key)
}

/// Open the S3-compatible bucket described by `target`
pub fn connect_s3(target: &S3Target) -> Result<Box<dyn ObjectStore>> {
    Ok(Box::new(S3Store::connect(target)?))
}

/// Validate settings, connect through `connect` and upload `path`
///
/// Returns the object location. `connect` is not called when a setting is missing.
pub fn upload<F>(path: &Path, settings: &S3Settings, connect: F) -> Result<String>
where
    F: FnOnce(&S3Target) -> Result<Box<dyn ObjectStore>>,
{
    let target = S3Target::resolve(settings)?;
    let store = connect(&target)?;
    let key = upload_file(path, store.as_ref())?;
    Ok(store.location(&key))
}
