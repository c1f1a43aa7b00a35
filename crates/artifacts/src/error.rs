//! Artifact Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! These errors never leave [`ArtifactStore`](crate::ArtifactStore): a failed
//! listing is logged and treated as "nothing built yet".

use derive_more::{Display, Error};

/// An artifact store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for artifact store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("artifact store returned {status} for {artifact}")]
    Status {
        #[error(not(source))]
        artifact: String,
        status: u16,
    },
    #[display("network error while listing {_0}")]
    Network(#[error(not(source))] String),
    #[display("invalid artifact listing for {_0}")]
    InvalidResponse(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_)) || matches!(self, Self::Status { status, .. } if *status >= 500)
    }
}
