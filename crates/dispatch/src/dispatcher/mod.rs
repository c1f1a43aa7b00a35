//! Dispatcher trait and implementations.

mod github;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::github::GithubDispatcher;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockDispatcher;
use crate::BuildRequest;
use crate::error::Result;
use async_trait::async_trait;

/// Something that can start a build job.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Name of the dispatch target (used for logging only).
    fn name(&self) -> &str;

    /// Trigger exactly one build job for `request`.
    ///
    /// Nothing is retried: an error means no job was started.
    async fn dispatch(&self, request: &BuildRequest) -> Result<()>;
}
