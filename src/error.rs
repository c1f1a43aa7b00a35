//! CLI Error Types

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("failed to load configuration")]
    Config,
    #[display("failed to access the build ledger")]
    Ledger,
    #[display("failed to set up the {_0} client")]
    Client(#[error(not(source))] &'static str),
    #[display("scheduling run aborted")]
    Schedule,
    #[display("lookup failed")]
    Lookup,
    #[display("library {_0} is not in the catalog")]
    UnknownLibrary(#[error(not(source))] String),
    #[display("invalid run name")]
    RunName,
    #[display("no ledger record for {_0:?}")]
    NoRecord(#[error(not(source))] String),
}
