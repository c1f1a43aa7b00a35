use crate::error::{ErrorKind, Result};
use crate::{Candidate, Context};
use exn::ResultExt;
use prebake_config::{EffectivePolicy, Platform};
use prebake_matcher::is_prerelease;
use prebake_registry::VersionInfo;

/// Does a published library version pass the policy's version filters?
///
/// Prerelease versions never qualify. The popularity gate is applied
/// separately since it needs download statistics.
pub(crate) fn qualifies(info: &VersionInfo, policy: &EffectivePolicy) -> bool {
    let Some(matcher) = &policy.version_matcher else {
        return false;
    };
    !is_prerelease(&info.version)
        && matcher.matches(&info.version)
        && policy.published_after.is_none_or(|after| info.published >= after)
}

/// Expand one effective policy of `library` on `platform` into candidates.
///
/// A policy without a version matcher yields nothing and makes no registry
/// calls. Registry failures are fatal.
pub async fn enumerate(
    ctx: &Context,
    library: &str,
    policy: &EffectivePolicy,
    platform: Platform,
) -> Result<Vec<Candidate>> {
    if policy.version_matcher.is_none() {
        tracing::debug!(library, %platform, "No version matcher; skipping policy");
        return Ok(Vec::new());
    }
    let registry_error = || ErrorKind::Registry { library: library.to_string(), platform };

    let companions = companion_versions(ctx, policy).await.or_raise(registry_error)?;
    let versions = library_versions(ctx, library, policy).await.or_raise(registry_error)?;
    if versions.is_empty() {
        tracing::debug!(library, %platform, "No library versions match");
        return Ok(Vec::new());
    }
    let runtimes: Vec<&String> = ctx
        .runtimes
        .versions()
        .iter()
        .filter(|runtime| policy.runtime_version_matcher.as_ref().is_none_or(|m| m.matches(runtime)))
        .collect();

    let artifact = platform.artifact_name(library);
    let mut candidates = Vec::new();
    for version in &versions {
        for runtime in &runtimes {
            if ctx.skip_built && ctx.artifacts.is_built_for(&artifact, version, runtime).await {
                tracing::trace!(library, %platform, %version, %runtime, "Already built");
                continue;
            }
            candidates.extend(companions.iter().map(|companion| Candidate {
                library: library.to_string(),
                version: version.clone(),
                platform,
                runtime_version: runtime.to_string(),
                companion_version: companion.clone(),
            }));
        }
    }
    tracing::debug!(
        library,
        %platform,
        versions = versions.len(),
        runtimes = runtimes.len(),
        candidates = candidates.len(),
        "Enumerated candidates"
    );
    Ok(candidates)
}

/// The companion axis. Never empty: without a matcher, or without matching
/// companion versions, it is the single value `None`.
async fn companion_versions(
    ctx: &Context,
    policy: &EffectivePolicy,
) -> prebake_registry::error::Result<Vec<Option<String>>> {
    let Some(matcher) = &policy.companion_version_matcher else {
        return Ok(vec![None]);
    };
    let companions: Vec<Option<String>> = ctx
        .registry
        .fetch_versions(&ctx.companion_package)
        .await?
        .into_iter()
        .map(|info| info.version)
        .filter(|version| !is_prerelease(version) && matcher.matches(version))
        .map(Some)
        .collect();
    if companions.is_empty() {
        tracing::debug!(package = %ctx.companion_package, pattern = %matcher, "No companion versions match");
        return Ok(vec![None]);
    }
    Ok(companions)
}

async fn library_versions(
    ctx: &Context,
    library: &str,
    policy: &EffectivePolicy,
) -> prebake_registry::error::Result<Vec<String>> {
    let history = ctx.registry.fetch_versions(library).await?;
    let matching: Vec<VersionInfo> = history.into_iter().filter(|info| qualifies(info, policy)).collect();
    let threshold = policy.weekly_downloads_threshold;
    if threshold == 0 || matching.is_empty() {
        return Ok(matching.into_iter().map(|info| info.version).collect());
    }
    let downloads = ctx.registry.fetch_weekly_downloads(library).await?;
    Ok(matching
        .into_iter()
        .filter(|info| {
            let weekly = downloads.get(&info.version).copied().unwrap_or(0);
            if weekly < threshold {
                tracing::trace!(library, version = %info.version, weekly, threshold, "Below popularity threshold");
            }
            weekly >= threshold
        })
        .map(|info| info.version)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prebake_artifacts::ArtifactStore;
    use prebake_artifacts::source::MockArtifactSource;
    use prebake_config::{LibraryPolicy, RuntimeCatalog};
    use prebake_registry::probe::MockRegistry;
    use std::sync::Arc;
    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};

    fn day(n: i64) -> OffsetDateTime {
        datetime!(2025-01-01 00:00 UTC) + Duration::days(n)
    }

    fn context(registry: Arc<MockRegistry>, artifacts: MockArtifactSource) -> Context {
        Context {
            registry,
            artifacts: ArtifactStore::new(Arc::new(artifacts)),
            runtimes: RuntimeCatalog::new(["0.79.0", "0.80.0", "0.81.0", "0.82.0"]),
            companion_package: "react-native-worklets".to_string(),
            skip_built: true,
        }
    }

    fn effective(json: &str, platform: Platform) -> EffectivePolicy {
        let policy: LibraryPolicy = serde_json::from_str(json).unwrap();
        policy.effective_policies(platform).unwrap().remove(0)
    }

    fn lib_registry() -> MockRegistry {
        MockRegistry::default()
            .with_versions("lib", [("1.0.0", day(0)), ("1.1.0", day(10)), ("1.2.0-rc.1", day(20)), ("2.0.0", day(30))])
            .with_downloads("lib", [("1.0.0", 50_000), ("1.1.0", 500), ("2.0.0", 50_000)])
    }

    fn versions(candidates: &[Candidate]) -> Vec<(&str, &str)> {
        candidates.iter().map(|c| (c.version.as_str(), c.runtime_version.as_str())).collect()
    }

    #[tokio::test]
    async fn test_cross_product_with_popularity_gate() {
        let registry = Arc::new(lib_registry());
        let ctx = context(registry.clone(), MockArtifactSource::default());
        let policy = effective(r#"{ "versionMatcher": "1.*", "runtimeVersionMatcher": ">=0.81.0" }"#, Platform::Ios);
        let candidates = enumerate(&ctx, "lib", &policy, Platform::Ios).await.unwrap();
        // 1.1.0 is unpopular and 1.2.0-rc.1 is a prerelease.
        assert_eq!(versions(&candidates), [("1.0.0", "0.81.0"), ("1.0.0", "0.82.0")]);
        assert!(candidates.iter().all(|c| c.companion_version.is_none() && c.platform == Platform::Ios));
        assert_eq!(registry.calls().await, ["versions:lib", "downloads:lib"]);
    }

    #[tokio::test]
    async fn test_zero_threshold_skips_download_stats() {
        let registry = Arc::new(lib_registry());
        let ctx = context(registry.clone(), MockArtifactSource::default());
        let policy = effective(
            r#"{ "versionMatcher": "1.*", "runtimeVersionMatcher": "0.82.0", "weeklyDownloadsThreshold": 0 }"#,
            Platform::Android,
        );
        let candidates = enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap();
        assert_eq!(versions(&candidates), [("1.0.0", "0.82.0"), ("1.1.0", "0.82.0")]);
        assert_eq!(registry.calls().await, ["versions:lib"]);
    }

    #[tokio::test]
    async fn test_missing_version_matcher_makes_no_calls() {
        let registry = Arc::new(lib_registry());
        let ctx = context(registry.clone(), MockArtifactSource::default());
        let policy = effective(r#"{ "runtimeVersionMatcher": ">=0.81.0" }"#, Platform::Android);
        assert!(enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap().is_empty());
        assert!(registry.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_absent_runtime_matcher_matches_every_runtime() {
        let ctx = context(Arc::new(lib_registry()), MockArtifactSource::default());
        let policy = effective(r#"{ "versionMatcher": "2.0.0" }"#, Platform::Android);
        let candidates = enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap();
        assert_eq!(candidates.len(), 4);
    }

    #[tokio::test]
    async fn test_published_after_is_inclusive() {
        let ctx = context(Arc::new(lib_registry()), MockArtifactSource::default());
        let policy = effective(
            r#"{
                "versionMatcher": ["1.*", "2.*"],
                "runtimeVersionMatcher": "0.82.0",
                "publishedAfterDate": "2025-01-31"
            }"#,
            Platform::Android,
        );
        let candidates = enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap();
        assert_eq!(versions(&candidates), [("2.0.0", "0.82.0")]);
    }

    #[tokio::test]
    async fn test_companion_axis() {
        let registry = Arc::new(lib_registry().with_versions(
            "react-native-worklets",
            [("0.4.0", day(0)), ("0.5.0", day(1)), ("0.5.1", day(2)), ("0.6.0-beta.1", day(3))],
        ));
        let ctx = context(registry.clone(), MockArtifactSource::default());
        let policy = effective(
            r#"{ "versionMatcher": "2.*", "runtimeVersionMatcher": "0.82.0", "workletsVersionMatcher": "0.5.*" }"#,
            Platform::Android,
        );
        let candidates = enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap();
        let companions: Vec<_> = candidates.iter().map(|c| c.companion_version.as_deref()).collect();
        assert_eq!(companions, [Some("0.5.0"), Some("0.5.1")]);
        assert_eq!(registry.calls().await[0], "versions:react-native-worklets");
    }

    #[tokio::test]
    async fn test_unmatched_companion_degenerates_to_none() {
        let registry =
            Arc::new(lib_registry().with_versions("react-native-worklets", [("0.4.0", day(0))]));
        let ctx = context(registry, MockArtifactSource::default());
        let policy = effective(
            r#"{ "versionMatcher": "2.*", "runtimeVersionMatcher": "0.82.0", "workletsVersionMatcher": "9.*" }"#,
            Platform::Android,
        );
        let candidates = enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].companion_version, None);
    }

    #[tokio::test]
    async fn test_already_built_pairs_are_dropped_per_platform() {
        let artifacts = MockArtifactSource::default().with_artifact("lib", ["2.0.0-rn0.81.0"]);
        let ctx = context(Arc::new(lib_registry()), artifacts);
        let policy =
            effective(r#"{ "versionMatcher": "2.*", "runtimeVersionMatcher": ">=0.81.0" }"#, Platform::Android);
        let android = enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap();
        assert_eq!(versions(&android), [("2.0.0", "0.82.0")]);
        // iOS artifacts live under "lib-ios".
        let ios = enumerate(&ctx, "lib", &policy, Platform::Ios).await.unwrap();
        assert_eq!(ios.len(), 2);
    }

    #[tokio::test]
    async fn test_skip_built_disabled() {
        let artifacts = MockArtifactSource::default().with_artifact("lib", ["2.0.0-rn0.81.0"]);
        let mut ctx = context(Arc::new(lib_registry()), artifacts);
        ctx.skip_built = false;
        let policy =
            effective(r#"{ "versionMatcher": "2.*", "runtimeVersionMatcher": ">=0.81.0" }"#, Platform::Android);
        assert_eq!(enumerate(&ctx, "lib", &policy, Platform::Android).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_registry_failure_is_fatal() {
        let ctx = context(Arc::new(MockRegistry::default()), MockArtifactSource::default());
        let policy = effective(r#"{ "versionMatcher": "1.*" }"#, Platform::Ios);
        let err = enumerate(&ctx, "missing", &policy, Platform::Ios).await.unwrap_err();
        match &*err {
            ErrorKind::Registry { library, platform } => {
                assert_eq!(library, "missing");
                assert_eq!(*platform, Platform::Ios);
            },
            other => panic!("unexpected error: {other}"),
        }
    }
}
