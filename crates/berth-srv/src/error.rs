//! Error types for the aggregation server and client.

use thiserror::Error;

/// Result type alias for berth-srv operations.
pub type Result<T> = std::result::Result<T, SrvError>;

/// Errors from the aggregation server, auth subsystem and client.
#[derive(Error, Debug)]
pub enum SrvError {
    /// Server failed to bind or serve.
    #[error("server error: {0}")]
    Server(String),

    /// Configuration is invalid or missing required fields.
    #[error("config error: {0}")]
    Config(String),

    /// Token issuance failed.
    #[error("token signing error: {0}")]
    Signing(String),

    /// A presented token failed validation.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Credentials were rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// Permission check failed.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// HTTP request to the aggregator failed.
    #[error("aggregator request failed: {0}")]
    Http(String),

    /// Unexpected response from the aggregator.
    #[error("aggregator returned status {0}")]
    Status(u16),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
