//! Build scheduling.
//!
//! For every library in the catalog and every enabled platform, the
//! [enumerator](enumerate) expands the library's policy into concrete build
//! [`Candidate`]s: library version × runtime version × optional companion
//! version. The [driver](schedule) then walks those candidates strictly in
//! order, consults the build ledger, and dispatches whatever has not been
//! scheduled before, stopping hard once the run's budget is spent.

mod candidate;
mod enumerate;
pub mod error;
mod oldest;
mod schedule;

pub use crate::candidate::Candidate;
pub use crate::enumerate::enumerate;
pub use crate::oldest::oldest_uncovered;
pub use crate::schedule::{LibraryReport, RunOptions, RunReport, schedule};
use prebake_artifacts::ArtifactStore;
use prebake_config::RuntimeCatalog;
use prebake_registry::RegistryHandle;

/// Everything enumeration needs besides the library policy itself.
pub struct Context {
    pub registry: RegistryHandle,
    pub artifacts: ArtifactStore,
    pub runtimes: RuntimeCatalog,
    /// Package whose versions make up the companion axis.
    pub companion_package: String,
    /// Drop (version, runtime) pairs the artifact store already has.
    pub skip_built: bool,
}
