//! Artifact listing sources.

mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::http::HttpArtifactSource;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockArtifactSource;
use crate::error::Result;
use async_trait::async_trait;

/// Anything that can list the combined versions published for an artifact.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Name of the source (used for logging only).
    fn name(&self) -> &str;

    /// Every combined version name (`"<packageVersion>-rn<runtimeVersion>"`)
    /// published for `artifact`.
    async fn list_versions(&self, artifact: &str) -> Result<Vec<String>>;
}
