//! GitHub Actions `workflow_dispatch` trigger.

use crate::BuildRequest;
use crate::dispatcher::Dispatcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::{OptionExt, ResultExt};
use prebake_config::DispatchSettings;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_VERSION: &str = "2022-11-28";

#[derive(Serialize)]
struct DispatchBody<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: Inputs<'a>,
}

/// Workflow inputs are always strings.
#[derive(Serialize)]
struct Inputs<'a> {
    library: &'a str,
    version: &'a str,
    platform: &'a str,
    rn_version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    worklets_version: Option<&'a str>,
    run_name: String,
}

impl<'a> DispatchBody<'a> {
    fn new(git_ref: &'a str, request: &'a BuildRequest) -> Self {
        Self {
            git_ref,
            inputs: Inputs {
                library: &request.library,
                version: &request.version,
                platform: request.platform.as_str(),
                rn_version: &request.runtime_version,
                worklets_version: request.companion_version.as_deref(),
                run_name: request.run_name(),
            },
        }
    }
}

/// Dispatches one workflow run per request, choosing the workflow file by
/// platform.
#[derive(Debug, Clone)]
pub struct GithubDispatcher {
    client: reqwest::Client,
    settings: DispatchSettings,
}

impl GithubDispatcher {
    pub fn new(settings: DispatchSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("prebake/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::Network("client construction".to_string()))?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self, workflow: &str) -> String {
        format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.settings.api_url.trim_end_matches('/'),
            self.settings.repository,
            workflow,
        )
    }
}

#[async_trait]
impl Dispatcher for GithubDispatcher {
    fn name(&self) -> &str {
        &self.settings.repository
    }

    async fn dispatch(&self, request: &BuildRequest) -> Result<()> {
        let token = self.settings.token.as_deref().ok_or_raise(|| ErrorKind::MissingToken)?;
        let workflow = self.settings.workflow(request.platform);
        let run_name = request.run_name();
        tracing::debug!(workflow, %run_name, "Dispatching workflow");
        let response = self
            .client
            .post(self.endpoint(workflow))
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&DispatchBody::new(&self.settings.git_ref, request))
            .send()
            .await
            .or_raise(|| ErrorKind::Network(run_name.clone()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            exn::bail!(ErrorKind::Status {
                workflow: workflow.to_string(),
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use prebake_config::Platform;
    use serde_json::json;

    fn settings(server: &mockito::Server, token: Option<&str>) -> DispatchSettings {
        DispatchSettings {
            api_url: server.url(),
            repository: "acme/prebuilds".to_string(),
            token: token.map(String::from),
            ..Default::default()
        }
    }

    fn request(platform: Platform, companion: Option<&str>) -> BuildRequest {
        BuildRequest {
            library: "react-native-reanimated".to_string(),
            version: "4.0.0".to_string(),
            platform,
            runtime_version: "0.79.2".to_string(),
            companion_version: companion.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_dispatch_posts_workflow_inputs() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/acme/prebuilds/actions/workflows/build-ios.yml/dispatches")
            .match_header("authorization", "Bearer ghp_token")
            .match_body(Matcher::Json(json!({
                "ref": "main",
                "inputs": {
                    "library": "react-native-reanimated",
                    "version": "4.0.0",
                    "platform": "ios",
                    "rn_version": "0.79.2",
                    "worklets_version": "0.5.1",
                    "run_name": "Build react-native-reanimated@4.0.0 for ios (RN 0.79.2) (worklets 0.5.1)"
                }
            })))
            .with_status(204)
            .create_async()
            .await;
        let dispatcher = GithubDispatcher::new(settings(&server, Some("ghp_token"))).unwrap();
        dispatcher.dispatch(&request(Platform::Ios, Some("0.5.1"))).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dispatch_omits_missing_companion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/acme/prebuilds/actions/workflows/build-android.yml/dispatches")
            .match_body(Matcher::Json(json!({
                "ref": "main",
                "inputs": {
                    "library": "react-native-reanimated",
                    "version": "4.0.0",
                    "platform": "android",
                    "rn_version": "0.79.2",
                    "run_name": "Build react-native-reanimated@4.0.0 for android (RN 0.79.2)"
                }
            })))
            .with_status(204)
            .create_async()
            .await;
        let dispatcher = GithubDispatcher::new(settings(&server, Some("ghp_token"))).unwrap();
        dispatcher.dispatch(&request(Platform::Android, None)).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dispatch_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/repos/acme/prebuilds/actions/workflows/build-ios.yml/dispatches")
            .with_status(422)
            .with_body(r#"{"message":"Unexpected inputs provided"}"#)
            .create_async()
            .await;
        let dispatcher = GithubDispatcher::new(settings(&server, Some("ghp_token"))).unwrap();
        let err = dispatcher.dispatch(&request(Platform::Ios, None)).await.unwrap_err();
        match &*err {
            ErrorKind::Status { workflow, status, .. } => {
                assert_eq!(workflow, "build-ios.yml");
                assert_eq!(*status, 422);
            },
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_dispatch_requires_token() {
        let server = mockito::Server::new_async().await;
        let dispatcher = GithubDispatcher::new(settings(&server, None)).unwrap();
        let err = dispatcher.dispatch(&request(Platform::Ios, None)).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::MissingToken));
    }
}
