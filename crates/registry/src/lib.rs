//! Package registry probe.
//!
//! Answers two questions about an npm package: which versions exist and when
//! each one was published, and how often each version was downloaded last
//! week. Publish timestamps are authoritative for ordering; the order of keys
//! in the registry document means nothing.

pub mod error;
mod models;
pub mod probe;

pub use crate::models::VersionInfo;
pub use crate::probe::RegistryProbe;
use std::sync::Arc;

pub type RegistryHandle = Arc<dyn RegistryProbe + Send + Sync>;
