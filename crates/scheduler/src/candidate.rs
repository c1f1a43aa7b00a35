use prebake_config::Platform;
use prebake_dispatch::BuildRequest;
use prebake_ledger::BuildKey;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One concrete build combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub library: String,
    pub version: String,
    pub platform: Platform,
    pub runtime_version: String,
    pub companion_version: Option<String>,
}

impl Candidate {
    /// The ledger key that deduplicates this candidate.
    pub fn key(&self) -> BuildKey {
        BuildKey::new(
            &self.library,
            &self.version,
            &self.runtime_version,
            self.platform,
            self.companion_version.clone(),
        )
    }

    pub fn request(&self) -> BuildRequest {
        BuildRequest {
            library: self.library.clone(),
            version: self.version.clone(),
            platform: self.platform,
            runtime_version: self.runtime_version.clone(),
            companion_version: self.companion_version.clone(),
        }
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}@{} ({}, RN {}", self.library, self.version, self.platform, self.runtime_version)?;
        if let Some(companion) = &self.companion_version {
            write!(f, ", worklets {companion}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_and_request_carry_every_component() {
        let candidate = Candidate {
            library: "react-native-reanimated".to_string(),
            version: "4.0.0".to_string(),
            platform: Platform::Android,
            runtime_version: "0.81.0".to_string(),
            companion_version: Some("0.5.0".to_string()),
        };
        let key = candidate.key();
        assert_eq!(key.package_name, "react-native-reanimated");
        assert_eq!(key.companion_version.as_deref(), Some("0.5.0"));
        assert_eq!(
            candidate.request().run_name(),
            "Build react-native-reanimated@4.0.0 for android (RN 0.81.0) (worklets 0.5.0)"
        );
        assert_eq!(candidate.to_string(), "react-native-reanimated@4.0.0 (android, RN 0.81.0, worklets 0.5.0)");
    }
}
