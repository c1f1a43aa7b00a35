//! Scheduler Error Types
//!
//! Only two failures end a scheduling run: a registry lookup and a dispatch.
//! Both carry enough context to report what the run was doing when it stopped;
//! the underlying transport error is the child of the raised [`Error`].

use derive_more::{Display, Error};
use prebake_config::Platform;

/// A scheduler error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scheduler operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("registry lookup failed while processing {library} for {platform}")]
    Registry {
        #[error(not(source))]
        library: String,
        #[error(not(source))]
        platform: Platform,
    },
    #[display("dispatch failed for {candidate}")]
    Dispatch {
        #[error(not(source))]
        candidate: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in a run is retried automatically; this only tells the caller
    /// whether running again later is worthwhile.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Registry { .. } | Self::Dispatch { .. } => true,
        }
    }
}
