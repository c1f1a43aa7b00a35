//! Configuration for the prebuilt-artifact scheduler.
//!
//! Three independent inputs are loaded here:
//!
//! - [`Settings`]: endpoints, credentials and file locations, merged from
//!   built-in defaults, an optional TOML file and `PREBAKE_*` environment
//!   variables (nested keys separated by `__`).
//! - [`Catalog`]: the per-library [`LibraryPolicy`] declarations.
//! - [`RuntimeCatalog`]: the ordered list of supported runtime versions.

mod catalog;
pub mod error;
mod platform;
mod policy;
mod settings;

pub use crate::catalog::{Catalog, RuntimeCatalog};
pub use crate::platform::Platform;
pub use crate::policy::{
    DEFAULT_WEEKLY_DOWNLOADS_THRESHOLD, EffectivePolicy, LibraryPolicy, PlatformPolicy, PolicyOverride,
};
pub use crate::settings::{ArtifactSettings, DispatchSettings, LedgerSettings, RegistrySettings, Settings};
pub use prebake_matcher::VersionPattern;
