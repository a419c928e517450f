use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ExportError, Result};

/// Commit export configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosting service connection and commit filter
    pub azure: AzureSettings,

    /// Export target and failure handling
    pub export: ExportSettings,

    /// Object store target, only used when exporting to S3
    pub s3: S3Settings,

    /// Log output settings
    pub logging: LoggingSettings,
}

/// Hosting service settings
///
/// All values are optional here; presence is checked when a value is first used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_token: Option<String>,

    /// Only commits authored by this email are exported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,

    /// Cutoff date, `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
}

/// Where the generated CSV ends up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    /// Local file only
    #[default]
    #[serde(alias = "FILE", alias = "File")]
    File,
    /// Local file, then uploaded to the object store
    #[serde(alias = "S3")]
    S3,
}

impl ExportTarget {
    /// Anything other than `s3` (any case) selects a local file export
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("s3") {
            ExportTarget::S3
        } else {
            ExportTarget::File
        }
    }
}

/// What to do when a single repository cannot be queried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log it and treat the repository as having no commits
    #[default]
    #[serde(alias = "SKIP", alias = "Skip")]
    Skip,
    /// Abort the whole run
    #[serde(alias = "FAIL", alias = "Fail")]
    Fail,
}

impl FailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" => Some(FailurePolicy::Skip),
            "fail" => Some(FailurePolicy::Fail),
            _ => None,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub target: ExportTarget,

    /// Directory the timestamped CSV files are written to
    pub output_dir: PathBuf,

    /// Exit non-zero when the upload fails
    pub fail_on_upload_error: bool,

    pub on_repository_error: FailurePolicy,
}

/// Object store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct S3Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    pub port: String,
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace, debug, info, warn or error
    pub level: String,

    /// text or json
    pub format: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            target: ExportTarget::File,
            output_dir: PathBuf::from("file"),
            fail_on_upload_error: false,
            on_repository_error: FailurePolicy::Skip,
        }
    }
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            bucket_name: None,
            access_key: None,
            secret_key: None,
            port: "443".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl AzureSettings {
    pub fn organization_url(&self) -> Result<&str> {
        require(&self.organization_url, super::ENV_ORGANIZATION_URL)
    }

    pub fn personal_token(&self) -> Result<&str> {
        require(&self.personal_token, super::ENV_PERSONAL_TOKEN)
    }

    pub fn author_email(&self) -> Result<&str> {
        require(&self.author_email, super::ENV_AUTHOR_EMAIL)
    }

    pub fn date_from(&self) -> Result<&str> {
        require(&self.date_from, super::ENV_DATE_FROM)
    }
}

/// Return the value of a setting, or a configuration error naming it
fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ExportError::Config(format!("missing setting: {}", name))),
    }
}
