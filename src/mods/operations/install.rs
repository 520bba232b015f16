// Package presence checks for the loader path

use std::path::PathBuf;

use tracing::info;

use crate::error::InstallError;
use crate::mods::pure::loader_exe_path;
use crate::mods::types::PackageKind;

use super::runner::RunnerLocator;

/// Fetches third-party packages on demand. `progress` receives 0..=100.
pub trait PackageInstaller: Send + Sync {
    fn is_installed(&self, kind: PackageKind) -> bool;

    fn ensure_installed(&self, kind: PackageKind, progress: &dyn Fn(u8)) -> Result<(), InstallError>;
}

/// Checks for packages the user installed by hand; never downloads
pub struct LocalPackages<R> {
    loader_root: PathBuf,
    runners_dir: PathBuf,
    runners: R,
}

impl<R: RunnerLocator> LocalPackages<R> {
    pub fn new(loader_root: PathBuf, runners_dir: PathBuf, runners: R) -> Self {
        Self {
            loader_root,
            runners_dir,
            runners,
        }
    }

    fn expected_location(&self, kind: PackageKind) -> PathBuf {
        match kind {
            PackageKind::Loader => loader_exe_path(&self.loader_root),
            PackageKind::Runtime => self.runners_dir.clone(),
        }
    }
}

impl<R: RunnerLocator> PackageInstaller for LocalPackages<R> {
    fn is_installed(&self, kind: PackageKind) -> bool {
        match kind {
            PackageKind::Loader => loader_exe_path(&self.loader_root).is_file(),
            PackageKind::Runtime => self.runners.locate("").is_some(),
        }
    }

    fn ensure_installed(&self, kind: PackageKind, progress: &dyn Fn(u8)) -> Result<(), InstallError> {
        progress(0);
        if !self.is_installed(kind) {
            return Err(InstallError::NotInstalled {
                kind,
                expected: self.expected_location(kind),
            });
        }
        info!("{} found", kind);
        progress(100);
        Ok(())
    }
}
