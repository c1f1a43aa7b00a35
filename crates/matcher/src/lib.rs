//! Version pattern matching.
//!
//! A [`VersionPattern`] is a list of entries, and a version matches the
//! pattern if it matches **any** entry. Each entry is one of:
//!
//! - **Wildcard** (contains `*`): compiled to an anchored regular expression
//!   where `.` is literal and `*` matches any run of characters. The version
//!   must also be valid semver, otherwise it never matches.
//! - **Exact** (a complete semver version): plain string equality.
//! - **Range** (anything else): evaluated as an npm-style semver range
//!   (`>=0.81.0`, `^3.0.0 || ~2.1.0`, `0.79.0 - 0.80.2`). If the range cannot
//!   be parsed the entry falls back to exact string equality.
//!
//! Prerelease filtering is not part of matching; see [`is_prerelease`] and
//! [`stable`].
//!
//! # Example
//!
//! ```
//! use prebake_matcher::VersionPattern;
//!
//! let pattern = VersionPattern::new(["3.*", ">=4.1.0 <5"]);
//! assert!(pattern.matches("3.16.1"));
//! assert!(pattern.matches("4.2.0"));
//! assert!(!pattern.matches("4.0.0"));
//! ```

mod pattern;
mod range;

pub use crate::pattern::VersionPattern;

/// Returns `true` if `version` is valid semver and carries a prerelease tag
/// (e.g. `1.0.0-rc.1`).
///
/// Invalid versions are not considered prereleases.
pub fn is_prerelease(version: &str) -> bool {
    semver::Version::parse(version).is_ok_and(|v| !v.pre.is_empty())
}

/// Returns `true` if `version` is syntactically valid semver.
pub fn is_valid(version: &str) -> bool {
    semver::Version::parse(version).is_ok()
}

/// Filter out every version carrying a prerelease tag.
pub fn stable<'a, I, S>(versions: I) -> impl Iterator<Item = S> + 'a
where
    I: IntoIterator<Item = S> + 'a,
    S: AsRef<str> + 'a,
{
    versions.into_iter().filter(|v| !is_prerelease(v.as_ref()))
}

/// Convenience wrapper around [`VersionPattern::matches`].
pub fn matches(version: &str, pattern: &VersionPattern) -> bool {
    pattern.matches(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0-rc.1", true)]
    #[case("0.81.0-nightly-20250101", true)]
    #[case("1.0.0", false)]
    #[case("1.0.0+build.5", false)]
    #[case("not a version", false)]
    fn test_is_prerelease(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(is_prerelease(version), expected);
    }

    #[test]
    fn test_stable_filter() {
        let versions = vec!["1.0.0", "1.1.0-beta.1", "1.1.0", "2.0.0-rc.0"];
        let stable: Vec<_> = stable(versions).collect();
        assert_eq!(stable, vec!["1.0.0", "1.1.0"]);
    }
}
