use crate::error::{ErrorKind, Result};
use crate::{Candidate, Context, enumerate};
use exn::ResultExt;
use prebake_config::{Catalog, LibraryPolicy, Platform};
use prebake_dispatch::DispatcherHandle;
use prebake_ledger::{BuildKey, Repository};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum number of builds to schedule in this run.
    pub limit: Option<usize>,
    /// Enumerate and consult the ledger, but dispatch and record nothing.
    pub dry_run: bool,
    /// Platforms to consider; empty means all of them.
    pub platforms: Vec<Platform>,
}

impl RunOptions {
    fn exhausted(&self, scheduled: usize) -> bool {
        self.limit.is_some_and(|limit| scheduled >= limit)
    }

    fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        Platform::ALL.into_iter().filter(|p| self.platforms.is_empty() || self.platforms.contains(p))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryReport {
    pub library: String,
    /// Zero means there was nothing to schedule.
    pub scheduled: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub scheduled: usize,
    pub libraries: Vec<LibraryReport>,
    /// The budget ran out while work was still unexamined or refused. A limit
    /// that exactly covers the available work does not halt the run.
    pub halted: bool,
}

/// Where a processing step left the run's budget.
enum Progress {
    Continue(usize),
    Halted(usize),
}

/// Run one scheduling pass over the whole catalog.
///
/// Libraries are processed in catalog order, then platforms, then each
/// platform's policies, then candidates, strictly one at a time. Before every
/// dispatch the ledger is consulted; a failed ledger read counts as "not
/// scheduled" and a failed ledger write is logged and ignored. Registry and
/// dispatch failures end the run.
///
/// Once `options.limit` builds have been scheduled no further registry call
/// is made and no further build is dispatched.
pub async fn schedule(
    ctx: &Context,
    catalog: &Catalog,
    ledger: &Repository,
    dispatcher: &DispatcherHandle,
    options: &RunOptions,
) -> Result<RunReport> {
    let mut report = RunReport::default();
    for (library, policy) in catalog.iter() {
        if options.exhausted(report.scheduled) {
            report.halted = true;
            break;
        }
        let before = report.scheduled;
        let progress = schedule_library(ctx, ledger, dispatcher, options, library, policy, before).await?;
        let (scheduled, halted) = match progress {
            Progress::Continue(n) => (n, false),
            Progress::Halted(n) => (n, true),
        };
        report.scheduled = scheduled;
        report.libraries.push(LibraryReport { library: library.to_string(), scheduled: scheduled - before });
        if halted {
            tracing::info!(limit = ?options.limit, "Scheduling budget exhausted");
            report.halted = true;
            break;
        }
    }
    Ok(report)
}

async fn schedule_library(
    ctx: &Context,
    ledger: &Repository,
    dispatcher: &DispatcherHandle,
    options: &RunOptions,
    library: &str,
    policy: &LibraryPolicy,
    mut scheduled: usize,
) -> Result<Progress> {
    for platform in options.platforms() {
        let Some(policies) = policy.effective_policies(platform) else {
            tracing::debug!(library, %platform, "Platform disabled");
            continue;
        };
        for effective in &policies {
            if options.exhausted(scheduled) {
                return Ok(Progress::Halted(scheduled));
            }
            let candidates = enumerate(ctx, library, effective, platform).await?;
            for candidate in candidates {
                match schedule_candidate(ledger, dispatcher, options, &candidate, scheduled).await? {
                    Progress::Continue(n) => scheduled = n,
                    halted @ Progress::Halted(_) => return Ok(halted),
                }
            }
        }
    }
    Ok(Progress::Continue(scheduled))
}

async fn schedule_candidate(
    ledger: &Repository,
    dispatcher: &DispatcherHandle,
    options: &RunOptions,
    candidate: &Candidate,
    scheduled: usize,
) -> Result<Progress> {
    let key = candidate.key();
    if already_scheduled(ledger, &key).await {
        tracing::trace!(%candidate, "Already scheduled");
        return Ok(Progress::Continue(scheduled));
    }
    if options.exhausted(scheduled) {
        return Ok(Progress::Halted(scheduled));
    }
    if options.dry_run {
        tracing::info!(%candidate, "Would dispatch build");
    } else {
        dispatcher
            .dispatch(&candidate.request())
            .await
            .or_raise(|| ErrorKind::Dispatch { candidate: candidate.to_string() })?;
        tracing::info!(%candidate, dispatcher = dispatcher.name(), "Dispatched build");
        record_scheduled(ledger, &key).await;
    }
    Ok(Progress::Continue(scheduled + 1))
}

/// A failed check counts as "not scheduled": a duplicate build beats a
/// silently missing one.
async fn already_scheduled(ledger: &Repository, key: &BuildKey) -> bool {
    ledger.exists_scheduled(key).await.unwrap_or_else(|e| {
        tracing::warn!(
            package = %key.package_name,
            version = %key.version,
            error = ?e,
            "Ledger check failed; assuming not scheduled"
        );
        false
    })
}

/// The build has already been dispatched, so a failed write must not end
/// the run.
async fn record_scheduled(ledger: &Repository, key: &BuildKey) {
    if let Err(e) = ledger.upsert(key).await {
        tracing::warn!(
            package = %key.package_name,
            version = %key.version,
            error = ?e,
            "Failed to record scheduled build"
        );
    }
}
