//! Versions-listing endpoint over HTTP.

use crate::error::{ErrorKind, Result};
use crate::source::ArtifactSource;
use async_trait::async_trait;
use exn::ResultExt;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct Listing {
    versions: Vec<String>,
}

/// Lists artifacts with `GET <url>/<artifact>`, expecting `{ "versions": [...] }`.
///
/// A 404 means the artifact has never been published and yields an empty list.
#[derive(Debug, Clone)]
pub struct HttpArtifactSource {
    client: reqwest::Client,
    url: String,
}

impl HttpArtifactSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .or_raise(|| ErrorKind::Network("client construction".to_string()))?;
        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// Scoped names keep their `@` but the separator must be escaped.
fn encode_artifact(artifact: &str) -> String {
    artifact.replace('%', "%25").replace('/', "%2f")
}

#[async_trait]
impl ArtifactSource for HttpArtifactSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn list_versions(&self, artifact: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}", self.url, encode_artifact(artifact));
        tracing::debug!(artifact, %url, "Listing artifact versions");
        let response = self.client.get(&url).send().await.or_raise(|| ErrorKind::Network(artifact.to_string()))?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status {
                artifact: artifact.to_string(),
                status: status.as_u16(),
            });
        }
        let listing: Listing =
            response.json().await.or_raise(|| ErrorKind::InvalidResponse(artifact.to_string()))?;
        Ok(listing.versions)
    }
}
