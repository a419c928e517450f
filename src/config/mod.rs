//! Configuration module
//!
//! Settings come from built-in defaults, an optional TOML file and the
//! process environment, in increasing order of precedence. Nothing is
//! validated up front; required values are checked where they are used.

mod types;

pub use types::{Config, ExportTarget, FailurePolicy, S3Settings};

use crate::error::{ExportError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_ORGANIZATION_URL: &str = "AZURE_ORGANIZATION_URL";
pub const ENV_PERSONAL_TOKEN: &str = "AZURE_PERSONAL_TOKEN";
pub const ENV_AUTHOR_EMAIL: &str = "GIT_AUTHOR_EMAIL";
pub const ENV_DATE_FROM: &str = "GIT_DATE_FROM";
pub const ENV_EXPORT_TARGET: &str = "TYPE_EXPORT_FILE";
pub const ENV_S3_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";
pub const ENV_S3_BUCKET_NAME: &str = "S3_BUCKET_NAME";
pub const ENV_S3_ACCESS_KEY: &str = "S3_ACCESS_KEY";
pub const ENV_S3_SECRET_KEY: &str = "S3_SECRET_KEY";
pub const ENV_S3_PORT: &str = "S3_PORT";
pub const ENV_OUTPUT_DIR: &str = "EXPORT_OUTPUT_DIR";
pub const ENV_FAIL_ON_UPLOAD_ERROR: &str = "FAIL_ON_UPLOAD_ERROR";
pub const ENV_ON_REPOSITORY_ERROR: &str = "ON_REPOSITORY_ERROR";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Load configuration from a TOML file
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        ExportError::Config(format!(
            "Cannot read config from '{}': {}. Run 'commit-export config init' to create one.",
            path.display(),
            e
        ))
    })?;

    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Default configuration file; required settings are listed commented out
pub const TEMPLATE: &str = r##"# commit-export configuration
# Environment variables override every value in this file.

[azure]
# organization_url = "https://dev.azure.com/your-org"  # AZURE_ORGANIZATION_URL
# personal_token = ""                                  # AZURE_PERSONAL_TOKEN
# author_email = "dev@example.com"                     # GIT_AUTHOR_EMAIL
# date_from = "2024-01-01"                             # GIT_DATE_FROM, YYYY-MM-DD

[export]
target = "file"               # TYPE_EXPORT_FILE: file or s3
output_dir = "file"           # EXPORT_OUTPUT_DIR
fail_on_upload_error = false  # FAIL_ON_UPLOAD_ERROR
on_repository_error = "skip"  # ON_REPOSITORY_ERROR: skip or fail

[s3]
# endpoint_url = "minio.local"  # S3_ENDPOINT_URL
# bucket_name = "exports"       # S3_BUCKET_NAME
# access_key = ""               # S3_ACCESS_KEY
# secret_key = ""               # S3_SECRET_KEY
port = "443"                    # S3_PORT

[logging]
level = "info"   # LOG_LEVEL
format = "text"  # LOG_FORMAT: text or json
"##;

/// Write the commented default configuration to `path`
pub fn write_template(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, TEMPLATE)?;
    Ok(())
}

/// Build the effective configuration: optional file, then the process environment
///
/// Also returns one message per environment value that was rejected, so the
/// caller can report them once logging is up.
pub fn resolve(path: Option<&Path>) -> Result<(Config, Vec<String>)> {
    let mut config = match path {
        Some(path) => load(path)?,
        None => Config::default(),
    };
    let rejected = apply_env(&mut config, |name| std::env::var(name).ok());
    Ok((config, rejected))
}

/// Overlay environment values onto `config`
///
/// Unset and empty variables leave the existing value untouched. Values that
/// cannot be parsed are left out and described in the returned list.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut rejected = Vec::new();
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let azure = &mut config.azure;
    for (name, slot) in [
        (ENV_ORGANIZATION_URL, &mut azure.organization_url),
        (ENV_PERSONAL_TOKEN, &mut azure.personal_token),
        (ENV_AUTHOR_EMAIL, &mut azure.author_email),
        (ENV_DATE_FROM, &mut azure.date_from),
    ] {
        if let Some(value) = get(name) {
            *slot = Some(value);
        }
    }

    let s3 = &mut config.s3;
    for (name, slot) in [
        (ENV_S3_ENDPOINT_URL, &mut s3.endpoint_url),
        (ENV_S3_BUCKET_NAME, &mut s3.bucket_name),
        (ENV_S3_ACCESS_KEY, &mut s3.access_key),
        (ENV_S3_SECRET_KEY, &mut s3.secret_key),
    ] {
        if let Some(value) = get(name) {
            *slot = Some(value);
        }
    }
    if let Some(port) = get(ENV_S3_PORT) {
        s3.port = port;
    }

    if let Some(target) = get(ENV_EXPORT_TARGET) {
        config.export.target = ExportTarget::parse(&target);
    }
    if let Some(dir) = get(ENV_OUTPUT_DIR) {
        config.export.output_dir = PathBuf::from(dir);
    }
    if let Some(flag) = get(ENV_FAIL_ON_UPLOAD_ERROR) {
        match parse_bool(&flag) {
            Some(flag) => config.export.fail_on_upload_error = flag,
            None => rejected.push(format!(
                "ignoring unknown {}={:?}; expected true or false",
                ENV_FAIL_ON_UPLOAD_ERROR, flag
            )),
        }
    }
    if let Some(policy) = get(ENV_ON_REPOSITORY_ERROR) {
        match FailurePolicy::parse(&policy) {
            Some(policy) => config.export.on_repository_error = policy,
            None => rejected.push(format!(
                "ignoring unknown {}={:?}; expected 'skip' or 'fail'",
                ENV_ON_REPOSITORY_ERROR, policy
            )),
        }
    }

    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.level = level;
    }
    if let Some(format) = get(ENV_LOG_FORMAT) {
        config.logging.format = format;
    }

    rejected
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
