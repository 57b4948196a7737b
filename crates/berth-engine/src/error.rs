//! Error types for engine access.

use thiserror::Error;

/// Result type alias for berth-engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur talking to the container engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine CLI binary could not be located.
    #[error("engine binary not found: {0}")]
    BinaryNotFound(String),

    /// An engine command exited non-zero.
    #[error("engine command `{command}` failed: {stderr}")]
    CommandFailed {
        /// The subcommand that failed (e.g. `info`).
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// An engine command exceeded its timeout.
    #[error("engine command `{0}` timed out")]
    Timeout(String),

    /// Engine output could not be parsed.
    #[error("engine output parse error: {0}")]
    Parse(String),

    /// Daemon process introspection failed.
    #[error("procfs error: {0}")]
    Procfs(String),

    /// IO error spawning the engine CLI.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
