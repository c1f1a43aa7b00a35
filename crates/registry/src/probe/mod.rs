//! Registry probe trait and implementations.

mod cached;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod npm;

pub use self::cached::CachedRegistry;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockRegistry;
pub use self::npm::NpmRegistry;
use crate::VersionInfo;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Unified interface for package registries.
///
/// Failures are never swallowed here: a registry error aborts whatever lookup
/// asked for it.
#[async_trait]
pub trait RegistryProbe: Send + Sync {
    /// Name of the registry (used for logging only).
    fn name(&self) -> &str;

    /// Full version history of `package`, oldest first.
    ///
    /// Keys that are not valid semver (registry bookkeeping such as
    /// `created`/`modified`) are excluded.
    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>>;

    /// Downloads per version over the last week.
    ///
    /// Versions absent from the map had no recorded downloads.
    async fn fetch_weekly_downloads(&self, package: &str) -> Result<HashMap<String, u64>>;
}
