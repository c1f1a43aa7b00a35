use crate::error::{Error, ErrorKind};
use prebake_config::Platform;
use regex::Regex;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

// Library names may be scoped (`@scope/name`), so the version is whatever
// follows the *last* `@` before " for ".
static RUN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Build (?<library>.+)@(?<version>[^@\s]+) for (?<platform>\S+) \(RN (?<runtime>[^)\s]+)\)(?: \(worklets (?<companion>[^)\s]+)\))?$",
    )
    .unwrap()
});

/// One build combination to dispatch.
///
/// `Display` renders the run name, e.g.
/// `Build react-native-reanimated@4.0.0 for android (RN 0.79.2) (worklets 0.5.1)`,
/// and `FromStr` parses it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildRequest {
    pub library: String,
    pub version: String,
    pub platform: Platform,
    pub runtime_version: String,
    pub companion_version: Option<String>,
}

impl BuildRequest {
    pub fn run_name(&self) -> String {
        self.to_string()
    }
}

impl Display for BuildRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Build {}@{} for {} (RN {})",
            self.library, self.version, self.platform, self.runtime_version
        )?;
        if let Some(companion) = &self.companion_version {
            write!(f, " (worklets {companion})")?;
        }
        Ok(())
    }
}

impl FromStr for BuildRequest {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::from(ErrorKind::InvalidRunName(s.to_string()));
        let captures = RUN_NAME.captures(s).ok_or_else(invalid)?;
        let platform = captures["platform"].parse::<Platform>().map_err(|_| invalid())?;
        Ok(Self {
            library: captures["library"].to_string(),
            version: captures["version"].to_string(),
            platform,
            runtime_version: captures["runtime"].to_string(),
            companion_version: captures.name("companion").map(|m| m.as_str().to_string()),
        })
    }
}
