//! Dispatch Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A dispatch error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The workflow API answered with a non-2xx status.
    #[display("workflow {workflow} dispatch returned {status}: {message}")]
    Status {
        #[error(not(source))]
        workflow: String,
        status: u16,
        #[error(not(source))]
        message: String,
    },
    /// The request never produced a response.
    #[display("network error while dispatching {_0}")]
    Network(#[error(not(source))] String),
    /// No API token is configured.
    #[display("no dispatch token configured")]
    MissingToken,
    /// A string does not follow the run-name format.
    #[display("not a build run name: {_0:?}")]
    InvalidRunName(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Network(_) => true,
            Self::MissingToken | Self::InvalidRunName(_) => false,
        }
    }
}
