//! Registry Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A registry error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// Every variant is fatal to the lookup that raised it; callers do not
/// recover from registry failures.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The registry answered with a non-2xx status.
    #[display("registry returned {status} for {package}: {message}")]
    Status {
        #[error(not(source))]
        package: String,
        status: u16,
        #[error(not(source))]
        message: String,
    },
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[display("network error while fetching {_0}")]
    Network(#[error(not(source))] String),
    /// The response body was not the expected document.
    #[display("invalid registry response for {_0}")]
    InvalidResponse(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Network(_) => true,
            Self::InvalidResponse(_) => false,
        }
    }
}
