//! Error types for the audit runner.

use thiserror::Error;

/// Result type alias for berth-checks operations.
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors that abort an audit run.
#[derive(Error, Debug)]
pub enum CheckError {
    /// The checklist names a check the registry does not contain.
    /// Fatal by design: a silently-skipped check is a false sense of
    /// security.
    #[error("no check named `{name}` in the registry")]
    UnknownCheck {
        /// The unresolvable checklist entry.
        name: String,
    },

    /// A check panicked or its worker could not be joined.
    #[error("check `{name}` aborted internally: {message}")]
    Internal {
        /// The check that failed.
        name: String,
        /// Join/panic detail.
        message: String,
    },
}
