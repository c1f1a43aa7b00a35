use crate::Context;
use crate::enumerate::qualifies;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use prebake_config::{LibraryPolicy, Platform};
use prebake_registry::VersionInfo;

/// The oldest published version of `library` that passes the platform's
/// version filters but has no artifact for any runtime version yet.
///
/// Selection is strictly by ascending publish time. A version qualifies if it
/// passes the filters of any of the platform's policies. Returns `None` when
/// the platform is disabled or every qualifying version is covered.
pub async fn oldest_uncovered(
    ctx: &Context,
    library: &str,
    policy: &LibraryPolicy,
    platform: Platform,
) -> Result<Option<VersionInfo>> {
    let Some(policies) = policy.effective_policies(platform) else {
        return Ok(None);
    };
    if policies.iter().all(|p| p.version_matcher.is_none()) {
        return Ok(None);
    }
    let mut history = ctx
        .registry
        .fetch_versions(library)
        .await
        .or_raise(|| ErrorKind::Registry { library: library.to_string(), platform })?;
    history.sort();
    let artifact = platform.artifact_name(library);
    for info in history.into_iter().filter(|info| policies.iter().any(|p| qualifies(info, p))) {
        if !ctx.artifacts.is_built(&artifact, &info.version).await {
            return Ok(Some(info));
        }
    }
    Ok(None)
}
