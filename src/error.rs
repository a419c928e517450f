use thiserror::Error;

/// Commit export error types
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Commit query failed for repository '{repository}': {message}")]
    RemoteQuery { repository: String, message: String },

    #[error("Project enumeration failed: {0}")]
    ProjectEnumeration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API request to {url} failed with status {status}")]
    Api { status: u16, url: String },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
