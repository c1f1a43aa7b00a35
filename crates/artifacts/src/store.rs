use crate::SourceHandle;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Separator between the package version and the runtime version in a
/// combined artifact version.
const RUNTIME_SEPARATOR: &str = "-rn";

/// The combined artifact version for a package version built against a
/// runtime version.
pub fn combined_name(package_version: &str, runtime_version: &str) -> String {
    format!("{package_version}{RUNTIME_SEPARATOR}{runtime_version}")
}

/// Cached view of an [`ArtifactSource`](crate::ArtifactSource).
///
/// The first query for an artifact lists it once; every later query for the
/// same artifact is answered from memory for the rest of the process. A failed
/// listing is cached too (as "unknown") and every query against it answers
/// `false`: a redundant build is preferable to a silently skipped one.
pub struct ArtifactStore {
    source: SourceHandle,
    cache: RwLock<HashMap<String, Option<HashSet<String>>>>,
}

impl ArtifactStore {
    pub fn new(source: SourceHandle) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn with_listing<F: FnOnce(&HashSet<String>) -> bool>(&self, artifact: &str, check: F) -> bool {
        if let Some(cached) = self.cache.read().await.get(artifact) {
            return cached.as_ref().is_some_and(check);
        }
        let listing = match self.source.list_versions(artifact).await {
            Ok(versions) => Some(versions.into_iter().collect::<HashSet<_>>()),
            Err(e) => {
                tracing::warn!(
                    artifact,
                    source = self.source.name(),
                    error = ?e,
                    "Artifact listing failed; assuming nothing is built"
                );
                None
            },
        };
        let answer = listing.as_ref().is_some_and(check);
        self.cache.write().await.insert(artifact.to_string(), listing);
        answer
    }

    /// Is `package_version` built for *any* runtime version?
    pub async fn is_built(&self, artifact: &str, package_version: &str) -> bool {
        let prefix = format!("{package_version}{RUNTIME_SEPARATOR}");
        self.with_listing(artifact, |versions| versions.iter().any(|v| v.starts_with(&prefix))).await
    }

    /// Is `package_version` built for exactly `runtime_version`?
    pub async fn is_built_for(&self, artifact: &str, package_version: &str, runtime_version: &str) -> bool {
        let combined = combined_name(package_version, runtime_version);
        self.with_listing(artifact, |versions| versions.contains(&combined)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockArtifactSource;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_prefix_match_on_package_version() {
        let source = Arc::new(MockArtifactSource::default().with_artifact("lib", ["1.0.0-rn0.79.0"]));
        let store = ArtifactStore::new(source);
        assert!(store.is_built("lib", "1.0.0").await);
        assert!(!store.is_built("lib", "2.0.0").await);
        // "1.0" is not a prefix of the package-version component.
        assert!(!store.is_built("lib", "1.0").await);
    }

    #[tokio::test]
    async fn test_exact_combination() {
        let source = Arc::new(MockArtifactSource::default().with_artifact("lib", ["1.0.0-rn0.79.0"]));
        let store = ArtifactStore::new(source);
        assert!(store.is_built_for("lib", "1.0.0", "0.79.0").await);
        assert!(!store.is_built_for("lib", "1.0.0", "0.80.0").await);
    }

    #[tokio::test]
    async fn test_one_listing_per_artifact() {
        let source = Arc::new(MockArtifactSource::default().with_artifact("lib", ["1.0.0-rn0.79.0"]));
        let store = ArtifactStore::new(source.clone());
        store.is_built("lib", "1.0.0").await;
        store.is_built("lib", "2.0.0").await;
        store.is_built_for("lib", "1.0.0", "0.79.0").await;
        store.is_built("other", "1.0.0").await;
        assert_eq!(source.calls().await, ["lib", "other"]);
    }

    #[tokio::test]
    async fn test_failure_is_cached_and_fails_open() {
        let source = Arc::new(
            MockArtifactSource::default().with_artifact("lib", ["1.0.0-rn0.79.0"]).failing("lib"),
        );
        let store = ArtifactStore::new(source.clone());
        assert!(!store.is_built("lib", "1.0.0").await);
        assert!(!store.is_built_for("lib", "1.0.0", "0.79.0").await);
        assert_eq!(source.calls().await, ["lib"]);
    }

    #[test]
    fn test_combined_name() {
        assert_eq!(combined_name("3.16.1", "0.79.2"), "3.16.1-rn0.79.2");
    }
}
