use crate::context::{load_catalog, load_settings, open_ledger, scheduler_context};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use prebake_config::Platform;
use prebake_dispatch::DispatcherHandle;
use prebake_dispatch::dispatcher::GithubDispatcher;
use prebake_scheduler::{RunOptions, RunReport};
use std::path::Path;
use std::sync::Arc;

pub async fn schedule(
    config: &Path,
    limit: Option<usize>,
    dry_run: bool,
    libraries: &[String],
    platforms: Vec<Platform>,
) -> Result<()> {
    let settings = load_settings(config)?;
    let mut catalog = load_catalog(&settings)?;
    if !libraries.is_empty() {
        for name in libraries.iter().filter(|name| catalog.get(name).is_none()) {
            tracing::warn!(library = %name, "Not in the catalog; ignoring");
        }
        catalog.retain_named(libraries);
    }
    let ctx = scheduler_context(&settings)?;
    let (db, ledger) = open_ledger(&settings, dry_run).await?;
    let dispatcher: DispatcherHandle =
        Arc::new(GithubDispatcher::new(settings.dispatch.clone()).or_raise(|| ErrorKind::Client("dispatch"))?);
    let options = RunOptions { limit, dry_run, platforms };

    tracing::info!(libraries = catalog.len(), ?limit, dry_run, "Starting scheduling run");
    let result = prebake_scheduler::schedule(&ctx, &catalog, &ledger, &dispatcher, &options).await;
    db.close().await;
    let report = result.or_raise(|| ErrorKind::Schedule)?;
    print!("{}", render_report(&report, dry_run));
    Ok(())
}

fn render_report(report: &RunReport, dry_run: bool) -> String {
    let verb = if dry_run { "would schedule" } else { "scheduled" };
    let mut out = String::new();
    for library in &report.libraries {
        if library.scheduled == 0 {
            out.push_str(&format!("{}: nothing to schedule\n", library.library));
        } else {
            out.push_str(&format!("{}: {verb} {}\n", library.library, library.scheduled));
        }
    }
    out.push_str(&format!("Total {verb}: {}\n", report.scheduled));
    if report.halted {
        out.push_str("Stopped early: scheduling limit reached\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use prebake_scheduler::LibraryReport;

    fn report(halted: bool) -> RunReport {
        RunReport {
            scheduled: 3,
            libraries: vec![
                LibraryReport { library: "react-native-reanimated".to_string(), scheduled: 0 },
                LibraryReport { library: "react-native-screens".to_string(), scheduled: 3 },
            ],
            halted,
        }
    }

    #[test]
    fn test_render_report() {
        assert_eq!(
            render_report(&report(false), false),
            "react-native-reanimated: nothing to schedule\nreact-native-screens: scheduled 3\nTotal scheduled: 3\n"
        );
    }

    #[test]
    fn test_render_halted_dry_run() {
        let rendered = render_report(&report(true), true);
        assert!(rendered.contains("react-native-screens: would schedule 3\n"));
        assert!(rendered.ends_with("Stopped early: scheduling limit reached\n"));
    }
}
