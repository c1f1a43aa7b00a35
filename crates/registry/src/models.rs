use std::cmp::Ordering;
use time::OffsetDateTime;

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Valid semver version string.
    pub version: String,
    pub published: OffsetDateTime,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>, published: OffsetDateTime) -> Self {
        Self { version: version.into(), published }
    }
}

/// Oldest first; ties broken by the version string so ordering is total.
impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.published.cmp(&other.published).then_with(|| self.version.cmp(&other.version))
    }
}
impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
