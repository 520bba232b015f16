//! Mod loader integration (XXMI Launcher)
//!
//! Games with a loader importer can be started through the loader instead of
//! directly. The loader injects its graphics hook and starts the game itself.
//!
//! ## Module Structure
//! - `types.rs`: Loader profiles, package kinds, launch request/result
//! - `pure/`: Profile lookup, loader config edits, loader command building
//! - `operations/`: Package checks, runtime discovery, config file I/O
//! - `pipelines/`: The loader launch bridge

mod operations;
mod pipelines;
mod pure;
mod types;

pub use operations::{CompatRuntime, LocalPackages, PackageInstaller, RunnerLocator, SystemRunners};
pub use pipelines::{LoaderDeps, LoaderLauncher, ModLoaderBridge};
pub use pure::{pick_profile, BuiltinProfiles, ProfileResolver};
pub use types::{LoaderLaunch, LoaderLaunchRequest, LoaderProfile, PackageKind};
