//! Error types for berth-core.

use thiserror::Error;

/// Result type alias for berth-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors from profile loading and report writing.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Profile file could not be read or parsed.
    #[error("profile error: {0}")]
    Profile(String),

    /// Report could not be serialized.
    #[error("report serialization error: {0}")]
    Report(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
