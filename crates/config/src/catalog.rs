use crate::error::{ErrorKind, Result};
use crate::policy::LibraryPolicy;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Format, Json};
use std::collections::BTreeMap;
use std::path::Path;

/// All library policies, keyed (and therefore iterated) by library name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    libraries: BTreeMap<String, LibraryPolicy>,
}

impl Catalog {
    pub fn new(libraries: impl IntoIterator<Item = (impl Into<String>, LibraryPolicy)>) -> Self {
        Self {
            libraries: libraries.into_iter().map(|(name, policy)| (name.into(), policy)).collect(),
        }
    }

    /// Load the catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            exn::bail!(ErrorKind::Catalog(path.to_path_buf()));
        }
        let libraries: BTreeMap<String, LibraryPolicy> =
            Figment::from(Json::file(path)).extract().or_raise(|| ErrorKind::Catalog(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), libraries = libraries.len(), "Loaded library catalog");
        Ok(Self { libraries })
    }

    pub fn get(&self, name: &str) -> Option<&LibraryPolicy> {
        self.libraries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LibraryPolicy)> {
        self.libraries.iter().map(|(name, policy)| (name.as_str(), policy))
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Keep only the named libraries. Unknown names are ignored.
    pub fn retain_named(&mut self, names: &[String]) {
        self.libraries.retain(|name, _| names.iter().any(|n| n == name));
    }
}

/// The ordered list of supported runtime versions.
///
/// Maintained externally and only ever appended to, so membership is all
/// that matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeCatalog {
    versions: Vec<String>,
}

impl RuntimeCatalog {
    pub fn new(versions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { versions: versions.into_iter().map(Into::into).collect() }
    }

    /// Load the catalog from a JSON array of version strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).or_raise(|| ErrorKind::RuntimeCatalog(path.to_path_buf()))?;
        let versions: Vec<String> =
            serde_json::from_slice(&bytes).or_raise(|| ErrorKind::RuntimeCatalog(path.to_path_buf()))?;
        tracing::debug!(path = %path.display(), versions = versions.len(), "Loaded runtime version catalog");
        Ok(Self { versions })
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }
}
