//! npm-style range parsing on top of [`semver::VersionReq`].
//!
//! `semver` uses Cargo's syntax: comparators are comma-separated, there is no
//! `||`, and a bare version means `^version`. The catalog uses npm syntax, so
//! ranges are rewritten before parsing:
//!
//! - `a || b` becomes two alternatives,
//! - `a - b` becomes `>=a, <=b`,
//! - whitespace between comparators becomes `,`,
//! - a bare complete version becomes `=version`,
//! - a bare partial version (`1`, `1.2`) becomes `~partial`, i.e. `1.x`/`1.2.x`.

use semver::{Version, VersionReq};

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^'];

/// Parse an npm-style range into a list of alternatives (logical OR).
///
/// Returns `None` if any alternative fails to parse.
pub(crate) fn parse(range: &str) -> Option<Vec<VersionReq>> {
    range.split("||").map(|alternative| parse_alternative(alternative.trim())).collect()
}

fn parse_alternative(alternative: &str) -> Option<VersionReq> {
    if alternative.is_empty() {
        return Some(VersionReq::STAR);
    }
    if let Some((low, high)) = alternative.split_once(" - ") {
        let low = Version::parse(low.trim()).ok()?;
        let high = Version::parse(high.trim()).ok()?;
        return VersionReq::parse(&format!(">={low}, <={high}")).ok();
    }
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_operator: Option<&str> = None;
    for token in alternative.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        // ">= 1.0.0" splits the operator from its version.
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            pending_operator = Some(token);
            continue;
        }
        let comparator = match pending_operator.take() {
            Some(op) => format!("{op}{token}"),
            None if Version::parse(token).is_ok() => format!("={token}"),
            None if is_partial(token) => format!("~{token}"),
            None => token.to_string(),
        };
        comparators.push(comparator);
    }
    if pending_operator.is_some() || comparators.is_empty() {
        return None;
    }
    VersionReq::parse(&comparators.join(", ")).ok()
}

/// `1` or `1.2`: numeric components only, fewer than three of them.
fn is_partial(token: &str) -> bool {
    let parts: Vec<&str> = token.split('.').collect();
    parts.len() < 3 && parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
