//! Runtime settings.
//!
//! Merged in order (later wins): built-in defaults, an optional TOML file,
//! then `PREBAKE_*` environment variables with `__` separating nested keys
//! (e.g. `PREBAKE_DISPATCH__TOKEN`).

use crate::error::{ErrorKind, Result};
use crate::platform::Platform;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "PREBAKE_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub registry: RegistrySettings,
    pub artifacts: ArtifactSettings,
    pub ledger: LedgerSettings,
    pub dispatch: DispatchSettings,
    /// npm package whose versions make up the companion axis.
    pub companion_package: String,
    /// Library catalog (JSON object of name to policy).
    pub catalog: PathBuf,
    /// Runtime-version catalog (JSON array, ascending).
    pub runtime_versions: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: RegistrySettings::default(),
            artifacts: ArtifactSettings::default(),
            ledger: LedgerSettings::default(),
            dispatch: DispatchSettings::default(),
            companion_package: "react-native-worklets".to_string(),
            catalog: PathBuf::from("libraries.json"),
            runtime_versions: PathBuf::from("react-native-versions.json"),
        }
    }
}

impl Settings {
    /// Load settings from defaults, the optional TOML file, and the environment.
    ///
    /// A missing file is not an error: every setting has a default.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading settings file");
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract().or_raise(|| ErrorKind::Settings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Package metadata endpoint.
    pub url: String,
    /// Download statistics endpoint.
    pub downloads_url: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            url: "https://registry.npmjs.org".to_string(),
            downloads_url: "https://api.npmjs.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    /// Base URL of the versions-listing endpoint.
    pub url: String,
    /// Drop candidates that already have a published artifact.
    pub enabled: bool,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            url: "https://maven.example.invalid/api/versions".to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub path: PathBuf,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        let path = ProjectDirs::from("dev", "prebake", "prebake")
            .map(|dirs| dirs.data_dir().join("ledger.sqlite"))
            .unwrap_or_else(|| PathBuf::from("ledger.sqlite"));
        Self { path }
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub api_url: String,
    /// `owner/name` of the repository hosting the build workflows.
    pub repository: String,
    pub git_ref: String,
    pub android_workflow: String,
    pub ios_workflow: String,
    pub token: Option<String>,
}

impl DispatchSettings {
    /// Workflow file that builds artifacts for `platform`.
    pub fn workflow(&self, platform: Platform) -> &str {
        match platform {
            Platform::Android => &self.android_workflow,
            Platform::Ios => &self.ios_workflow,
        }
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            repository: String::new(),
            git_ref: "main".to_string(),
            android_workflow: "build-android.yml".to_string(),
            ios_workflow: "build-ios.yml".to_string(),
            token: None,
        }
    }
}

// Keep the token out of logs.
impl Debug for DispatchSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("DispatchSettings")
            .field("api_url", &self.api_url)
            .field("repository", &self.repository)
            .field("git_ref", &self.git_ref)
            .field("android_workflow", &self.android_workflow)
            .field("ios_workflow", &self.ios_workflow)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
