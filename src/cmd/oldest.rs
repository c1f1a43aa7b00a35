use crate::context::{load_catalog, load_settings, scheduler_context};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use prebake_config::Platform;
use std::path::Path;
use time::format_description::well_known::Rfc3339;

pub async fn oldest(config: &Path, library: &str, platform: Platform) -> Result<()> {
    let settings = load_settings(config)?;
    let catalog = load_catalog(&settings)?;
    let policy = catalog.get(library).ok_or_raise(|| ErrorKind::UnknownLibrary(library.to_string()))?;
    let ctx = scheduler_context(&settings)?;
    match prebake_scheduler::oldest_uncovered(&ctx, library, policy, platform).await.or_raise(|| ErrorKind::Lookup)? {
        Some(info) => {
            let published = info.published.format(&Rfc3339).unwrap_or_else(|_| info.published.to_string());
            println!("{library}@{} (published {published})", info.version);
        },
        None => println!("{library}: none found for {platform}"),
    }
    Ok(())
}
