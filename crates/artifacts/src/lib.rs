//! Artifact store probe.
//!
//! The artifact store publishes one artifact per (package version, runtime
//! version) pair under a combined name, `"<packageVersion>-rn<runtimeVersion>"`.
//! [`ArtifactStore`] lists those names once per artifact per process and
//! answers "is this built?" from memory afterwards.

pub mod error;
pub mod source;
mod store;

pub use crate::source::ArtifactSource;
pub use crate::store::{ArtifactStore, combined_name};
use std::sync::Arc;

pub type SourceHandle = Arc<dyn ArtifactSource + Send + Sync>;
