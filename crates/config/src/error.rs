//! Config Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Settings could not be merged from defaults, file and environment.
    #[display("invalid settings")]
    Settings,
    /// The library catalog is missing or malformed.
    #[display("invalid library catalog: {}", _0.display())]
    Catalog(#[error(not(source))] PathBuf),
    /// The runtime-version catalog is missing or malformed.
    #[display("invalid runtime version catalog: {}", _0.display())]
    RuntimeCatalog(#[error(not(source))] PathBuf),
    #[display("invalid date: {_0}")]
    InvalidDate(#[error(not(source))] String),
    #[display("unknown platform: {_0}")]
    UnknownPlatform(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
