//! In-memory artifact source for testing.

use crate::error::{ErrorKind, Result};
use crate::source::ArtifactSource;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory artifact source for testing.
///
/// Unknown artifacts list as empty. Artifacts registered with
/// [`failing`](Self::failing) answer with a 500. Every call is recorded.
#[derive(Default)]
pub struct MockArtifactSource {
    artifacts: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: RwLock<Vec<String>>,
}

impl MockArtifactSource {
    pub fn with_artifact(
        mut self,
        artifact: impl Into<String>,
        versions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.artifacts.insert(artifact.into(), versions.into_iter().map(Into::into).collect());
        self
    }

    pub fn failing(mut self, artifact: impl Into<String>) -> Self {
        self.failing.insert(artifact.into());
        self
    }

    /// Artifacts listed so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl ArtifactSource for MockArtifactSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_versions(&self, artifact: &str) -> Result<Vec<String>> {
        self.calls.write().await.push(artifact.to_string());
        if self.failing.contains(artifact) {
            exn::bail!(ErrorKind::Status {
                artifact: artifact.to_string(),
                status: 500,
            });
        }
        Ok(self.artifacts.get(artifact).cloned().unwrap_or_default())
    }
}
