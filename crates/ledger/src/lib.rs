//! SQLite build ledger.
//!
//! The ledger is the only thing that stops the scheduler from dispatching the
//! same build twice. It stores one [`BuildRecord`] per natural key:
//!
//! `(package_name, version, runtime_version, platform, companion_version)`
//!
//! where a missing companion version is a distinct key value rather than a
//! wildcard. A record with `retry = false` blocks rescheduling; a record with
//! `retry = true` (set by the reconciliation process to force a rebuild) does
//! not. Records are never deleted here.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{BuildKey, BuildRecord, BuildStatus};
pub use crate::repo::Repository;
