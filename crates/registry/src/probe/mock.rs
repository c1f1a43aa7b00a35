//! In-memory registry for testing.

use crate::VersionInfo;
use crate::error::{ErrorKind, Result};
use crate::probe::RegistryProbe;
use async_trait::async_trait;
use std::collections::HashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory registry for testing.
///
/// Unknown packages answer with a 404 [`ErrorKind::Status`]. Every call is
/// recorded as `"versions:<package>"` or `"downloads:<package>"` so tests can
/// assert exactly which lookups happened.
#[derive(Default)]
pub struct MockRegistry {
    versions: HashMap<String, Vec<VersionInfo>>,
    downloads: HashMap<String, HashMap<String, u64>>,
    calls: RwLock<Vec<String>>,
}

impl MockRegistry {
    /// Register a package's versions. Order is irrelevant; results are sorted
    /// by publish time like a real registry probe.
    pub fn with_versions(
        mut self,
        package: impl Into<String>,
        versions: impl IntoIterator<Item = (impl Into<String>, OffsetDateTime)>,
    ) -> Self {
        let mut versions: Vec<VersionInfo> = versions.into_iter().map(|(v, at)| VersionInfo::new(v, at)).collect();
        versions.sort();
        self.versions.insert(package.into(), versions);
        self
    }

    /// Register last-week downloads for some of a package's versions.
    pub fn with_downloads(
        mut self,
        package: impl Into<String>,
        downloads: impl IntoIterator<Item = (impl Into<String>, u64)>,
    ) -> Self {
        let map = downloads.into_iter().map(|(v, n)| (v.into(), n)).collect();
        self.downloads.insert(package.into(), map);
        self
    }

    /// Every lookup performed so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    fn not_found(package: &str) -> exn::Exn<ErrorKind> {
        exn::Exn::from(ErrorKind::Status {
            package: package.to_string(),
            status: 404,
            message: "Not found".to_string(),
        })
    }
}

#[async_trait]
impl RegistryProbe for MockRegistry {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>> {
        self.calls.write().await.push(format!("versions:{package}"));
        self.versions.get(package).cloned().ok_or_else(|| Self::not_found(package))
    }

    async fn fetch_weekly_downloads(&self, package: &str) -> Result<HashMap<String, u64>> {
        self.calls.write().await.push(format!("downloads:{package}"));
        self.downloads.get(package).cloned().ok_or_else(|| Self::not_found(package))
    }
}
