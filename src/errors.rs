use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur when using the Vidmill SDK.
#[derive(Error, Debug)]
pub enum VidmillError {
    /// The configuration document is unusable, e.g. no `source` setting
    /// survived the merge.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },

    /// A base config path was supplied but no file exists there.
    #[error("base config file not found: {}", .path.display())]
    BaseFileNotFound { path: PathBuf },

    /// The API key is missing or was rejected by the service (HTTP 401).
    #[error("authentication failed: {message}")]
    Authentication { message: String },

    /// The requested job or metadata record does not exist (HTTP 404).
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other error reported by the encoding service. `error_code` is the
    /// service's own code (e.g. `config_not_valid`) when one was returned.
    #[error("service error {status_code}: {message}")]
    Service {
        status_code: u16,
        error_code: Option<String>,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// A transport-level HTTP error from reqwest.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O error, typically from reading a base config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Waiting for job completion exceeded the configured timeout.
    #[error("wait timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The job reached a terminal error status.
    #[error("job failed: {0}")]
    JobFailed(String),
}

/// A convenience alias for `Result<T, VidmillError>`.
pub type Result<T> = std::result::Result<T, VidmillError>;
