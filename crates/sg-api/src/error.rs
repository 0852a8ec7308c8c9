//! API value errors

use thiserror::Error;

/// Errors raised while building API values from user input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// API version is not of the form `MAJOR.MINOR`
    #[error("Invalid API version '{0}': expected MAJOR.MINOR")]
    InvalidVersion(String),

    /// Daemon host address could not be parsed
    #[error("Invalid daemon host '{host}': {reason}")]
    InvalidHost { host: String, reason: String },
}
