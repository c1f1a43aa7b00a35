//! In-memory dispatcher for testing.

use crate::BuildRequest;
use crate::dispatcher::Dispatcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Records every request instead of starting a job.
///
/// With [`failing_at`](Self::failing_at) the n-th call (zero-based) fails
/// with a 500 [`ErrorKind::Status`]; failed calls are recorded too.
#[derive(Default)]
pub struct MockDispatcher {
    fail_at: Option<usize>,
    calls: RwLock<Vec<BuildRequest>>,
}

impl MockDispatcher {
    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Every request received so far, in order.
    pub async fn calls(&self) -> Vec<BuildRequest> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn dispatch(&self, request: &BuildRequest) -> Result<()> {
        let mut calls = self.calls.write().await;
        let index = calls.len();
        calls.push(request.clone());
        if self.fail_at == Some(index) {
            exn::bail!(ErrorKind::Status {
                workflow: "mock".to_string(),
                status: 500,
                message: "Internal server error".to_string(),
            });
        }
        Ok(())
    }
}
