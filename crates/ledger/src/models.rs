use crate::error::{Error, ErrorKind};
use derive_more::Display;
use exn::ResultExt;
use prebake_config::Platform;
use std::str::FromStr;
use time::UtcDateTime;

/// Natural key of a build obligation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildKey {
    pub package_name: String,
    pub version: String,
    pub runtime_version: String,
    pub platform: Platform,
    /// `None` is a key value of its own, not "any companion".
    pub companion_version: Option<String>,
}

impl BuildKey {
    pub fn new(
        package_name: impl Into<String>,
        version: impl Into<String>,
        runtime_version: impl Into<String>,
        platform: Platform,
        companion_version: Option<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            version: version.into(),
            runtime_version: runtime_version.into(),
            platform,
            companion_version,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    #[display("scheduled")]
    Scheduled,
    #[display("completed")]
    Completed,
    #[display("failed")]
    Failed,
}

impl FromStr for BuildStatus {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(Error::from(ErrorKind::InvalidData("build status"))),
        }
    }
}

/// One row of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub key: BuildKey,
    pub status: BuildStatus,
    /// Set externally to force a rebuild; such records no longer block
    /// scheduling.
    pub retry: bool,
    pub github_run_url: Option<String>,
    pub build_duration_seconds: Option<u64>,
    pub created_at: UtcDateTime,
    pub updated_at: UtcDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct BuildRow {
    package_name: String,
    version: String,
    runtime_version: String,
    companion_version: Option<String>,
    platform: String,
    status: String,
    retry: bool,
    github_run_url: Option<String>,
    build_duration_seconds: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<BuildRow> for BuildRecord {
    type Error = Error;
    fn try_from(row: BuildRow) -> Result<Self, Self::Error> {
        let platform = row.platform.parse::<Platform>().or_raise(|| ErrorKind::InvalidData("platform"))?;
        Ok(Self {
            key: BuildKey {
                package_name: row.package_name,
                version: row.version,
                runtime_version: row.runtime_version,
                platform,
                companion_version: row.companion_version,
            },
            status: row.status.parse()?,
            retry: row.retry,
            github_run_url: row.github_run_url,
            build_duration_seconds: row
                .build_duration_seconds
                .map(u64::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("build duration"))?,
            created_at: UtcDateTime::from_unix_timestamp(row.created_at)
                .or_raise(|| ErrorKind::InvalidData("creation date"))?,
            updated_at: UtcDateTime::from_unix_timestamp(row.updated_at)
                .or_raise(|| ErrorKind::InvalidData("update date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> BuildRow {
        BuildRow {
            package_name: "react-native-screens".to_string(),
            version: "4.0.0".to_string(),
            runtime_version: "0.79.0".to_string(),
            companion_version: None,
            platform: "ios".to_string(),
            status: "completed".to_string(),
            retry: false,
            github_run_url: Some("https://github.com/acme/prebuilds/actions/runs/1".to_string()),
            build_duration_seconds: Some(321),
            created_at: 1_700_000_000,
            updated_at: 1_700_000_600,
        }
    }

    #[test]
    fn test_row_to_record() {
        let record = BuildRecord::try_from(row()).unwrap();
        assert_eq!(record.key.platform, Platform::Ios);
        assert_eq!(record.status, BuildStatus::Completed);
        assert_eq!(record.build_duration_seconds, Some(321));
        assert_eq!(record.created_at.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = BuildRecord::try_from(BuildRow { status: "exploded".to_string(), ..row() }).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("build status")));
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let err = BuildRecord::try_from(BuildRow { build_duration_seconds: Some(-1), ..row() }).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("build duration")));
    }
}
