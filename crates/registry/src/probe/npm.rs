//! npm registry over HTTP.

use crate::VersionInfo;
use crate::error::{ErrorKind, Result};
use crate::probe::RegistryProbe;
use async_trait::async_trait;
use exn::ResultExt;
use serde::Deserialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::collections::HashMap;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The subset of an npm "packument" that matters here.
#[derive(Deserialize)]
struct Packument {
    #[serde(default)]
    time: HashMap<String, TimeEntry>,
    #[serde(default)]
    versions: HashMap<String, IgnoredAny>,
}

/// Publish times are strings; bookkeeping entries such as `unpublished` are not.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimeEntry {
    Published(String),
    Other(IgnoredAny),
}

#[derive(Deserialize)]
struct VersionDownloads {
    #[serde(default)]
    downloads: HashMap<String, u64>,
}

/// Registry probe backed by the npm HTTP API.
///
/// # Examples
///
/// ```no_run
/// use prebake_registry::RegistryProbe;
/// use prebake_registry::probe::NpmRegistry;
///
/// # async fn example() -> prebake_registry::error::Result<()> {
/// let registry = NpmRegistry::new("https://registry.npmjs.org", "https://api.npmjs.org")?;
/// let versions = registry.fetch_versions("react-native-screens").await?;
/// println!("{} versions, oldest {}", versions.len(), versions[0].version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    url: String,
    downloads_url: String,
}

impl NpmRegistry {
    pub fn new(url: impl Into<String>, downloads_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("prebake/", env!("CARGO_PKG_VERSION")))
            .build()
            .or_raise(|| ErrorKind::Network("client construction".to_string()))?;
        Ok(Self::with_client(client, url, downloads_url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>, downloads_url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            downloads_url: downloads_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, package: &str, url: String) -> Result<T> {
        tracing::debug!(package, %url, "Querying registry");
        let response = self.client.get(&url).send().await.or_raise(|| ErrorKind::Network(package.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            exn::bail!(ErrorKind::Status {
                package: package.to_string(),
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }
        response.json::<T>().await.or_raise(|| ErrorKind::InvalidResponse(package.to_string()))
    }
}

/// Scoped packages keep their `@` but the separator must be escaped.
fn encode_package(package: &str) -> String {
    package.replace('/', "%2f")
}

fn versions_from_packument(package: &str, packument: Packument) -> Vec<VersionInfo> {
    let mut versions: Vec<VersionInfo> = packument
        .time
        .into_iter()
        .filter(|(key, _)| prebake_matcher::is_valid(key))
        // Unpublished versions linger in the time map.
        .filter(|(key, _)| packument.versions.is_empty() || packument.versions.contains_key(key))
        .filter_map(|(version, entry)| match entry {
            TimeEntry::Published(timestamp) => Some((version, timestamp)),
            TimeEntry::Other(_) => None,
        })
        .filter_map(|(version, timestamp)| match OffsetDateTime::parse(&timestamp, &Rfc3339) {
            Ok(published) => Some(VersionInfo::new(version, published)),
            Err(_) => {
                tracing::warn!(package, %version, %timestamp, "Skipping version with unparseable publish time");
                None
            },
        })
        .collect();
    versions.sort();
    versions
}

#[async_trait]
impl RegistryProbe for NpmRegistry {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch_versions(&self, package: &str) -> Result<Vec<VersionInfo>> {
        let url = format!("{}/{}", self.url, encode_package(package));
        let packument: Packument = self.get(package, url).await?;
        Ok(versions_from_packument(package, packument))
    }

    async fn fetch_weekly_downloads(&self, package: &str) -> Result<HashMap<String, u64>> {
        let url = format!("{}/versions/{}/last-week", self.downloads_url, encode_package(package));
        let stats: VersionDownloads = self.get(package, url).await?;
        Ok(stats.downloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const PACKUMENT: &str = r#"{
        "name": "react-native-example",
        "time": {
            "created": "2023-01-01T00:00:00.000Z",
            "modified": "2025-03-01T00:00:00.000Z",
            "2.0.0": "2024-02-01T00:00:00.000Z",
            "1.0.0": "2024-01-01T00:00:00.000Z",
            "2.1.0-beta.1": "2024-03-01T00:00:00.000Z",
            "0.9.0": "2023-06-01T00:00:00.000Z"
        },
        "versions": {
            "2.0.0": {}, "1.0.0": {}, "2.1.0-beta.1": {}
        }
    }"#;

    fn registry(server: &mockito::Server) -> NpmRegistry {
        NpmRegistry::new(server.url(), server.url()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_versions_orders_by_publish_time() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/react-native-example")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PACKUMENT)
            .create_async()
            .await;
        let versions = registry(&server).fetch_versions("react-native-example").await.unwrap();
        mock.assert_async().await;
        // "created"/"modified" are not versions; 0.9.0 was unpublished.
        let names: Vec<_> = versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(names, ["1.0.0", "2.0.0", "2.1.0-beta.1"]);
        assert_eq!(versions[0].published, datetime!(2024-01-01 00:00 UTC));
    }

    #[tokio::test]
    async fn test_fetch_versions_propagates_status() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/missing").with_status(404).with_body("Not found").create_async().await;
        let err = registry(&server).fetch_versions("missing").await.unwrap_err();
        match &*err {
            ErrorKind::Status { package, status, message } => {
                assert_eq!(package, "missing");
                assert_eq!(*status, 404);
                assert_eq!(message, "Not found");
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_versions_scoped_package() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", mockito::Matcher::Regex(r"^/@shopify%2[fF]flash-list$".to_string()))
            .with_status(200)
            .with_body(r#"{ "time": { "1.0.0": "2024-01-01T00:00:00Z" }, "versions": { "1.0.0": {} } }"#)
            .create_async()
            .await;
        let versions = registry(&server).fetch_versions("@shopify/flash-list").await.unwrap();
        mock.assert_async().await;
        assert_eq!(versions.len(), 1);
    }

    #[test]
    fn test_non_string_time_entries_are_skipped() {
        let packument: Packument = serde_json::from_str(
            r#"{
                "time": {
                    "modified": "2025-03-01T00:00:00.000Z",
                    "unpublished": { "time": "2025-01-01T00:00:00.000Z", "versions": ["0.9.0"] },
                    "1.0.0": "2024-01-01T00:00:00.000Z",
                    "1.1.0": { "unexpected": true }
                }
            }"#,
        )
        .unwrap();
        let versions = versions_from_packument("lib", packument);
        let names: Vec<_> = versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(names, ["1.0.0"]);
    }

    #[tokio::test]
    async fn test_fetch_versions_invalid_body() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/broken").with_status(200).with_body("<html>").create_async().await;
        let err = registry(&server).fetch_versions("broken").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidResponse(p) if p == "broken"));
    }

    #[tokio::test]
    async fn test_fetch_weekly_downloads() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/versions/react-native-example/last-week")
            .with_status(200)
            .with_body(r#"{ "package": "react-native-example", "downloads": { "1.0.0": 120, "2.0.0": 45000 } }"#)
            .create_async()
            .await;
        let downloads = registry(&server).fetch_weekly_downloads("react-native-example").await.unwrap();
        assert_eq!(downloads.get("2.0.0"), Some(&45000));
        assert_eq!(downloads.get("3.0.0"), None);
    }
}
