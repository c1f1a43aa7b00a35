//! Per-run memoisation of registry lookups.
//!
//! Wraps another probe and remembers every successful answer for the rest of
//! the process. Failures are not remembered; they abort the run anyway.

use crate::error::Result;
use crate::probe::RegistryProbe;
use crate::{RegistryHandle, VersionInfo};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct CachedRegistry {
    inner: RegistryHandle,
    versions: RwLock<HashMap<String, Vec<VersionInfo>>>,
    downloads: RwLock<HashMap<String, HashMap<String, u64>>>,
}

impl CachedRegistry {
    pub fn new(inner: RegistryHandle) -> Self {
        Self {
            inner,
            versions: RwLock::new(HashMap::new()),
            downloads: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RegistryProbe for CachedRegistry {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>> {
        if let Some(hit) = self.versions.read().await.get(package) {
            return Ok(hit.clone());
        }
        let fetched = self.inner.fetch_versions(package).await?;
        self.versions.write().await.insert(package.to_string(), fetched.clone());
        Ok(fetched)
    }

    async fn fetch_weekly_downloads(&self, package: &str) -> Result<HashMap<String, u64>> {
        if let Some(hit) = self.downloads.read().await.get(package) {
            return Ok(hit.clone());
        }
        let fetched = self.inner.fetch_weekly_downloads(package).await?;
        self.downloads.write().await.insert(package.to_string(), fetched.clone());
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::MockRegistry;
    use std::sync::Arc;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let mock = Arc::new(MockRegistry::default().with_versions("lib", [("1.0.0", datetime!(2024-01-01 00:00 UTC))]));
        let cached = CachedRegistry::new(mock.clone());
        assert_eq!(cached.fetch_versions("lib").await.unwrap().len(), 1);
        assert_eq!(cached.fetch_versions("lib").await.unwrap().len(), 1);
        assert_eq!(mock.calls().await, ["versions:lib"]);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock = Arc::new(MockRegistry::default());
        let cached = CachedRegistry::new(mock.clone());
        assert!(cached.fetch_versions("missing").await.is_err());
        assert!(cached.fetch_versions("missing").await.is_err());
        assert_eq!(mock.calls().await.len(), 2);
    }
}
