use crate::error::{Error, ErrorKind};
use crate::policy::{LibraryPolicy, PlatformPolicy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Target platform of a native build.
///
/// Everything that differs per platform hangs off this enum so callers never
/// branch on a string tag: which policy block applies, how the artifact store
/// names the library, and which workflow builds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// Every platform, in scheduling order.
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    /// The library's policy block for this platform.
    pub fn policy<'a>(&self, library: &'a LibraryPolicy) -> &'a PlatformPolicy {
        match self {
            Self::Android => &library.android,
            Self::Ios => &library.ios,
        }
    }

    /// Name under which the artifact store lists a package's artifacts.
    ///
    /// Scoped npm names (`@scope/name`) are flattened to `scope__name`; iOS
    /// frameworks are published under a separate `-ios` suffixed name.
    pub fn artifact_name(&self, package_name: &str) -> String {
        let flattened = package_name.trim_start_matches('@').replace('/', "__");
        match self {
            Self::Android => flattened,
            Self::Ios => format!("{flattened}-ios"),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "android" => Self::Android,
            "ios" => Self::Ios,
            _ => exn::bail!(ErrorKind::UnknownPlatform(s.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Platform::Android, "react-native-screens", "react-native-screens")]
    #[case(Platform::Ios, "react-native-screens", "react-native-screens-ios")]
    #[case(Platform::Android, "@shopify/flash-list", "shopify__flash-list")]
    #[case(Platform::Ios, "@shopify/flash-list", "shopify__flash-list-ios")]
    fn test_artifact_name(#[case] platform: Platform, #[case] package: &str, #[case] expected: &str) {
        assert_eq!(platform.artifact_name(package), expected);
    }

    #[rstest]
    #[case("android", Platform::Android)]
    #[case("iOS", Platform::Ios)]
    #[case(" ios ", Platform::Ios)]
    fn test_parse(#[case] input: &str, #[case] expected: Platform) {
        assert_eq!(input.parse::<Platform>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "windows".parse::<Platform>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnknownPlatform(p) if p == "windows"));
    }
}
