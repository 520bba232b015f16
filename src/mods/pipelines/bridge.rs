//! Loader-mediated launch
//!
//! The loader process starts the game itself, so the pid we get back is the
//! loader's. Callers track the game by executable name from then on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::LoaderSettings;
use crate::error::LaunchError;
use crate::launch::{format_launch_cmd, ProcessSpawner};
use crate::mods::operations::{
    update_loader_config, CompatRuntime, PackageInstaller, RunnerLocator,
};
use crate::mods::pure::{
    build_loader_command, pick_profile, ProfileResolver, LOADER_CONFIG_FILE, LOADER_EXE,
};
use crate::mods::types::{LoaderLaunch, LoaderLaunchRequest, PackageKind};
use crate::paths::{PATH_LOADER, PATH_RUNNERS};
use crate::process::StaleProcessKiller;

pub trait LoaderLauncher: Send + Sync {
    fn launch_with_loader(&self, request: &LoaderLaunchRequest) -> Result<LoaderLaunch, LaunchError>;
}

/// Services the bridge drives
pub struct LoaderDeps {
    pub profiles: Arc<dyn ProfileResolver>,
    pub installer: Arc<dyn PackageInstaller>,
    pub runners: Arc<dyn RunnerLocator>,
    pub killer: Arc<dyn StaleProcessKiller>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub clock: Arc<dyn Clock>,
}

pub struct ModLoaderBridge {
    loader_root: PathBuf,
    /// Prefix shared by all loader launches; `None` = the game's prefix
    prefix: Option<String>,
    runner: String,
    startup_grace: Duration,
    deps: LoaderDeps,
}

impl ModLoaderBridge {
    pub fn new(settings: &LoaderSettings, deps: LoaderDeps) -> Self {
        let loader_root = match settings.path.trim() {
            "" => PATH_LOADER.clone(),
            path => PathBuf::from(path),
        };
        let prefix = Some(settings.prefix.trim().to_string()).filter(|p| !p.is_empty());

        Self {
            loader_root,
            prefix,
            runner: settings.runner.trim().to_string(),
            startup_grace: settings.startup_grace(),
            deps,
        }
    }

    #[cfg(test)]
    fn with_root(mut self, loader_root: PathBuf) -> Self {
        self.loader_root = loader_root;
        self
    }

    /// The game's own runner if it is a Proton build, then the configured
    /// loader runner, then whatever is installed
    fn find_runtime(&self, request: &LoaderLaunchRequest) -> Result<CompatRuntime, LaunchError> {
        let runners = &self.deps.runners;
        let found = [request.runner_path.as_str(), self.runner.as_str()]
            .into_iter()
            .filter(|candidate| !candidate.trim().is_empty())
            .find_map(|candidate| runners.locate(candidate))
            .or_else(|| runners.locate(""));
        if let Some(runtime) = found {
            return Ok(runtime);
        }

        let progress = |p: u8| debug!("Installing {}: {}%", PackageKind::Runtime, p);
        match self.deps.installer.ensure_installed(PackageKind::Runtime, &progress) {
            Ok(()) => runners.locate("").ok_or_else(|| LaunchError::MissingRunner(PATH_RUNNERS.clone())),
            Err(e) => {
                warn!("{}", e);
                Err(LaunchError::MissingRunner(PATH_RUNNERS.clone()))
            }
        }
    }
}

impl LoaderLauncher for ModLoaderBridge {
    fn launch_with_loader(&self, request: &LoaderLaunchRequest) -> Result<LoaderLaunch, LaunchError> {
        let profile = pick_profile(
            request.importer.as_deref(),
            self.deps.profiles.as_ref(),
            &request.executable_name,
        )
        .ok_or_else(|| LaunchError::UnsupportedGame(request.executable_name.clone()))?;

        if !self.deps.installer.is_installed(PackageKind::Loader) {
            info!("{} not found, installing", PackageKind::Loader);
            let progress = |p: u8| debug!("Installing {}: {}%", PackageKind::Loader, p);
            self.deps.installer.ensure_installed(PackageKind::Loader, &progress)?;
        }

        let runtime = self.find_runtime(request)?;

        let game_folder = request.game_directory.to_string_lossy();
        update_loader_config(
            &self.loader_root.join(LOADER_CONFIG_FILE),
            profile.id(),
            &game_folder,
        )?;

        // Leftovers from an earlier attempt would keep the loader from injecting
        self.deps.killer.kill_matching(&request.executable_name);
        self.deps.killer.kill_matching(LOADER_EXE);

        let prefix = self.prefix.as_deref().unwrap_or(&request.prefix);
        let cmd = build_loader_command(&runtime.wine64(), &self.loader_root, prefix, &profile);
        info!("Launching {} with {} via {}", request.executable_name, profile, runtime.name);
        debug!("{}", format_launch_cmd(&cmd, "Loader command"));

        let mut child = self
            .deps
            .spawner
            .spawn_detached(&cmd)
            .map_err(|source| LaunchError::Spawn {
                program: LOADER_EXE.to_string(),
                source,
            })?;
        let loader_pid = child.pid();
        let started_at = self.deps.clock.now();

        let reaper = std::thread::Builder::new()
            .name(format!("loader-{}", loader_pid))
            .spawn(move || match child.wait() {
                Ok(code) => info!("Loader (pid {}) exited with {:?}", loader_pid, code),
                Err(e) => warn!("Lost track of loader (pid {}): {}", loader_pid, e),
            });
        if let Err(e) = reaper {
            warn!("Could not watch loader (pid {}): {}", loader_pid, e);
        }

        // Give the loader time to start the game
        std::thread::sleep(self.startup_grace);
        info!("Loader started with pid {}", loader_pid);

        Ok(LoaderLaunch {
            loader_pid,
            started_at,
            profile,
        })
    }
}
