//! Operations module (atomic side effects)

pub mod install;
pub mod loader_config_io;
pub mod runner;

pub use install::{LocalPackages, PackageInstaller};
pub use loader_config_io::update_loader_config;
pub use runner::{CompatRuntime, RunnerLocator, SystemRunners};
