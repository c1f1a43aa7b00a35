use crate::range;
use regex::Regex;
use semver::{Version, VersionReq};
use serde::{Deserialize, Deserializer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone)]
enum Entry {
    Wildcard(Regex),
    Exact(String),
    Range { raw: String, alternatives: Vec<VersionReq> },
}
impl Entry {
    fn compile(raw: &str) -> Self {
        if raw.contains('*') {
            let anchored = format!("^{}$", raw.split('*').map(regex::escape).collect::<Vec<_>>().join(".*"));
            // Every literal segment is escaped, so the expression is always valid.
            return match Regex::new(&anchored) {
                Ok(regex) => Self::Wildcard(regex),
                Err(_) => Self::Exact(raw.to_string()),
            };
        }
        if Version::parse(raw).is_ok() {
            return Self::Exact(raw.to_string());
        }
        match range::parse(raw) {
            Some(alternatives) => Self::Range { raw: raw.to_string(), alternatives },
            None => Self::Exact(raw.to_string()),
        }
    }

    fn matches(&self, version: &str) -> bool {
        match self {
            Self::Wildcard(regex) => Version::parse(version).is_ok() && regex.is_match(version),
            Self::Exact(expected) => version == expected,
            Self::Range { raw, alternatives } => match Version::parse(version) {
                Ok(parsed) => alternatives.iter().any(|req| req.matches(&parsed)),
                Err(_) => version == raw,
            },
        }
    }
}

/// A compiled version pattern: one or more entries combined with logical OR.
///
/// Deserializes from either a single string or a list of strings.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    raw: Vec<String>,
    entries: Vec<Entry>,
}

impl VersionPattern {
    /// Compile a pattern from its entries.
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let raw: Vec<String> = entries.into_iter().map(|e| Into::<String>::into(e).trim().to_string()).collect();
        let entries = raw.iter().map(|r| Entry::compile(r)).collect();
        Self { raw, entries }
    }

    /// Returns `true` if `version` matches any entry of the pattern.
    pub fn matches(&self, version: &str) -> bool {
        self.entries.iter().any(|entry| entry.matches(version))
    }

    /// The entries as written in configuration.
    pub fn entries(&self) -> &[String] {
        &self.raw
    }
}

impl PartialEq for VersionPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl Eq for VersionPattern {}

impl FromStr for VersionPattern {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new([s]))
    }
}

impl From<&str> for VersionPattern {
    fn from(value: &str) -> Self {
        Self::new([value])
    }
}

impl Display for VersionPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.raw.join(" | "))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPattern {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for VersionPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPattern::deserialize(deserializer)? {
            RawPattern::One(entry) => Self::new([entry]),
            RawPattern::Many(entries) => Self::new(entries),
        })
    }
}
