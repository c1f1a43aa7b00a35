//! Ledger maintenance for the reconciliation process.
//!
//! Builds are addressed by their run name, which is exactly what a finished
//! workflow run reports back.

use crate::context::{load_settings, open_ledger};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use prebake_dispatch::BuildRequest;
use prebake_ledger::{BuildKey, BuildRecord, BuildStatus};
use std::path::Path;
use time::format_description::well_known::Rfc3339;

fn key_from_run_name(run_name: &str) -> Result<BuildKey> {
    let request: BuildRequest = run_name
        .parse::<BuildRequest>()
        .or_raise(|| ErrorKind::RunName)?;
    Ok(BuildKey::new(
        request.library,
        request.version,
        request.runtime_version,
        request.platform,
        request.companion_version,
    ))
}

fn render_record(record: &BuildRecord) -> String {
    let key = &record.key;
    let request = BuildRequest {
        library: key.package_name.clone(),
        version: key.version.clone(),
        platform: key.platform,
        runtime_version: key.runtime_version.clone(),
        companion_version: key.companion_version.clone(),
    };
    let updated = record.updated_at.format(&Rfc3339).unwrap_or_default();
    let mut line = format!("{:<9} {updated}  {request}", record.status.to_string());
    if record.retry {
        line.push_str("  [retry]");
    }
    if let Some(url) = &record.github_run_url {
        line.push_str(&format!("  {url}"));
    }
    line
}

pub async fn ledger_list(config: &Path, status: Option<BuildStatus>, limit: u32) -> Result<()> {
    let settings = load_settings(config)?;
    let (db, ledger) = open_ledger(&settings, false).await?;
    let records = ledger.list(status, Some(limit)).await;
    db.close().await;
    for record in records.or_raise(|| ErrorKind::Ledger)? {
        println!("{}", render_record(&record));
    }
    Ok(())
}

/// An outcome reported for a dispatched build.
pub enum Outcome<'a> {
    Completed { run_url: &'a str, duration: u64 },
    Failed { run_url: Option<&'a str> },
    Retry,
}

pub async fn ledger_update(config: &Path, run_name: &str, outcome: Outcome<'_>) -> Result<()> {
    let key = key_from_run_name(run_name)?;
    let settings = load_settings(config)?;
    let (db, ledger) = open_ledger(&settings, false).await?;
    let matched = match outcome {
        Outcome::Completed { run_url, duration } => ledger.mark_completed(&key, run_url, duration).await,
        Outcome::Failed { run_url } => ledger.mark_failed(&key, run_url).await,
        Outcome::Retry => ledger.mark_for_retry(&key).await,
    };
    db.close().await;
    if !matched.or_raise(|| ErrorKind::Ledger)? {
        exn::bail!(ErrorKind::NoRecord(run_name.to_string()));
    }
    tracing::info!(%run_name, "Ledger updated");
    Ok(())
}
