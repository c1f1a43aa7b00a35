//! Declarative per-library build policy.
//!
//! A [`LibraryPolicy`] carries library-wide defaults plus an optional list of
//! [`PolicyOverride`]s per platform. Resolution is a two-level fallback: an
//! override field that is unset inherits the library default. If the resolved
//! `versionMatcher` is still absent the override produces nothing at all; an
//! absent version matcher never means "match everything".

use crate::error::{ErrorKind, Result};
use crate::platform::Platform;
use exn::ResultExt;
use prebake_matcher::VersionPattern;
use serde::{Deserialize, Deserializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Minimum weekly downloads a library version needs before it is built.
pub const DEFAULT_WEEKLY_DOWNLOADS_THRESHOLD: u64 = 10_000;

/// Policy for one library, as declared in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryPolicy {
    #[serde(default)]
    pub version_matcher: Option<VersionPattern>,
    #[serde(default, alias = "reactNativeVersionMatcher")]
    pub runtime_version_matcher: Option<VersionPattern>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub published_after_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub weekly_downloads_threshold: Option<u64>,
    #[serde(default, alias = "workletsVersionMatcher")]
    pub companion_version_matcher: Option<VersionPattern>,
    #[serde(default)]
    pub android: PlatformPolicy,
    #[serde(default)]
    pub ios: PlatformPolicy,
}

/// A platform-specific refinement of a [`LibraryPolicy`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOverride {
    #[serde(default)]
    pub version_matcher: Option<VersionPattern>,
    #[serde(default, alias = "reactNativeVersionMatcher")]
    pub runtime_version_matcher: Option<VersionPattern>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub published_after_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub weekly_downloads_threshold: Option<u64>,
    #[serde(default, alias = "workletsVersionMatcher")]
    pub companion_version_matcher: Option<VersionPattern>,
}

/// What a library declares for one platform.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PlatformPolicy {
    /// No platform block (or `true`, or an empty list): one override that
    /// inherits every library default.
    #[default]
    Inherit,
    /// `false`: the platform is never built.
    Disabled,
    /// A non-empty, ordered list of overrides.
    Overrides(Vec<PolicyOverride>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPlatformPolicy {
    Flag(bool),
    Overrides(Vec<PolicyOverride>),
}

impl<'de> Deserialize<'de> for PlatformPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawPlatformPolicy::deserialize(deserializer)? {
            RawPlatformPolicy::Flag(false) => Self::Disabled,
            RawPlatformPolicy::Flag(true) => Self::Inherit,
            RawPlatformPolicy::Overrides(list) if list.is_empty() => Self::Inherit,
            RawPlatformPolicy::Overrides(list) => Self::Overrides(list),
        })
    }
}

/// The fully resolved policy for one override of one platform.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectivePolicy {
    /// `None` means the override must be skipped.
    pub version_matcher: Option<VersionPattern>,
    /// `None` means every runtime version in the catalog.
    pub runtime_version_matcher: Option<VersionPattern>,
    /// Inclusive lower bound on library publish time.
    pub published_after: Option<OffsetDateTime>,
    pub weekly_downloads_threshold: u64,
    /// `None` means no companion axis.
    pub companion_version_matcher: Option<VersionPattern>,
}

impl EffectivePolicy {
    fn resolve(library: &LibraryPolicy, over: &PolicyOverride) -> Self {
        Self {
            version_matcher: over.version_matcher.clone().or_else(|| library.version_matcher.clone()),
            runtime_version_matcher: over
                .runtime_version_matcher
                .clone()
                .or_else(|| library.runtime_version_matcher.clone()),
            published_after: over.published_after_date.or(library.published_after_date),
            weekly_downloads_threshold: over
                .weekly_downloads_threshold
                .or(library.weekly_downloads_threshold)
                .unwrap_or(DEFAULT_WEEKLY_DOWNLOADS_THRESHOLD),
            companion_version_matcher: over
                .companion_version_matcher
                .clone()
                .or_else(|| library.companion_version_matcher.clone()),
        }
    }
}

impl LibraryPolicy {
    /// Expand the platform's overrides into effective policies.
    ///
    /// Returns `None` when the platform is explicitly disabled.
    pub fn effective_policies(&self, platform: Platform) -> Option<Vec<EffectivePolicy>> {
        match platform.policy(self) {
            PlatformPolicy::Disabled => None,
            PlatformPolicy::Inherit => Some(vec![EffectivePolicy::resolve(self, &PolicyOverride::default())]),
            PlatformPolicy::Overrides(list) => Some(list.iter().map(|o| EffectivePolicy::resolve(self, o)).collect()),
        }
    }
}

/// Parse an ISO date (`2024-06-01`) or RFC 3339 timestamp into a UTC instant.
///
/// A plain date is interpreted as midnight UTC.
pub(crate) fn parse_date(value: &str) -> Result<OffsetDateTime> {
    let value = value.trim();
    if let Ok(timestamp) = OffsetDateTime::parse(value, &Rfc3339) {
        return Ok(timestamp);
    }
    let date = Date::parse(value, format_description!("[year]-[month]-[day]"))
        .or_raise(|| ErrorKind::InvalidDate(value.to_string()))?;
    Ok(date.midnight().assume_utc())
}

fn deserialize_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<OffsetDateTime>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|value| parse_date(&value).map_err(|e| serde::de::Error::custom(&*e))).transpose()
}
