//! Wiring of settings into live clients.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use prebake_artifacts::ArtifactStore;
use prebake_artifacts::source::HttpArtifactSource;
use prebake_config::{Catalog, RuntimeCatalog, Settings};
use prebake_ledger::{Database, Repository};
use prebake_registry::RegistryHandle;
use prebake_registry::probe::{CachedRegistry, NpmRegistry};
use prebake_scheduler::Context;
use std::path::Path;
use std::sync::Arc;

pub fn load_settings(config: &Path) -> Result<Settings> {
    let settings = Settings::load(Some(config)).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?settings, "Loaded settings");
    Ok(settings)
}

pub fn load_catalog(settings: &Settings) -> Result<Catalog> {
    Catalog::load(&settings.catalog).or_raise(|| ErrorKind::Config)
}

pub fn scheduler_context(settings: &Settings) -> Result<Context> {
    let runtimes = RuntimeCatalog::load(&settings.runtime_versions).or_raise(|| ErrorKind::Config)?;
    let npm = NpmRegistry::new(&settings.registry.url, &settings.registry.downloads_url)
        .or_raise(|| ErrorKind::Client("registry"))?;
    // Overrides and platforms of one library share a single lookup per run.
    let registry: RegistryHandle = Arc::new(CachedRegistry::new(Arc::new(npm)));
    let source = HttpArtifactSource::new(&settings.artifacts.url).or_raise(|| ErrorKind::Client("artifact store"))?;
    Ok(Context {
        registry,
        artifacts: ArtifactStore::new(Arc::new(source)),
        runtimes,
        companion_package: settings.companion_package.clone(),
        skip_built: settings.artifacts.enabled,
    })
}

pub async fn open_ledger(settings: &Settings, dry_run: bool) -> Result<(Database, Repository)> {
    let db = Database::connect(&settings.ledger.path).await.or_raise(|| ErrorKind::Ledger)?;
    let repo = Repository::new(db.pool().clone(), dry_run);
    Ok((db, repo))
}
