//! Launch sequencer
//!
//! Drives one launch request through validation, the collision check,
//! pre-launch hooks, mode selection and spawning, then hands the run to the
//! registry. Direct launches get an exit-watcher thread; loader launches are
//! ended by the reconciler.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::LaunchError;
use crate::game::{GameRecord, GameStore};
use crate::launch::operations::{run_pre_launch, ProcessSpawner, ShellRunner, SupervisedProcess};
use crate::launch::pure::{format_launch_cmd, resolve, select_mode, validate_game, LaunchMode};
use crate::launch::types::{LaunchOutcome, LaunchPhase};
use crate::mods::{pick_profile, LoaderLauncher, LoaderLaunchRequest, LoaderProfile, ProfileResolver};
use crate::process::ProcessProbe;
use crate::tracking::{Admission, Reconciler, RunId, RunRegistry, RunningGame, TrackedRun};

use super::session::{SessionCommitter, SessionEnd};

/// External services the sequencer depends on
pub struct Collaborators {
    pub store: Arc<dyn GameStore>,
    pub probe: Arc<dyn ProcessProbe>,
    pub shell: Arc<dyn ShellRunner>,
    pub spawner: Arc<dyn ProcessSpawner>,
    pub loader: Arc<dyn LoaderLauncher>,
    pub profiles: Arc<dyn ProfileResolver>,
    pub clock: Arc<dyn Clock>,
}

pub struct Launcher {
    registry: Arc<RunRegistry>,
    sessions: Arc<SessionCommitter>,
    store: Arc<dyn GameStore>,
    probe: Arc<dyn ProcessProbe>,
    shell: Arc<dyn ShellRunner>,
    spawner: Arc<dyn ProcessSpawner>,
    loader: Arc<dyn LoaderLauncher>,
    profiles: Arc<dyn ProfileResolver>,
    clock: Arc<dyn Clock>,
    launch_grace: Duration,
}

/// A registry reservation that is released unless the launch gets tracked
struct Reservation<'a> {
    registry: &'a RunRegistry,
    game_id: String,
    run_id: RunId,
    tracked: bool,
}

impl Reservation<'_> {
    fn track(&mut self, run: TrackedRun) {
        self.tracked = self.registry.activate(run);
        if !self.tracked {
            warn!("Reservation for {} vanished before tracking", self.game_id);
        }
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.tracked {
            self.registry.release(&self.game_id, self.run_id);
        }
    }
}

impl Launcher {
    pub fn new(deps: Collaborators, launch_grace: Duration) -> Self {
        let sessions = Arc::new(SessionCommitter::new(deps.store.clone(), deps.shell.clone()));
        Self {
            registry: Arc::new(RunRegistry::new()),
            sessions,
            store: deps.store,
            probe: deps.probe,
            shell: deps.shell,
            spawner: deps.spawner,
            loader: deps.loader,
            profiles: deps.profiles,
            clock: deps.clock,
            launch_grace,
        }
    }

    pub fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }

    /// Reconciler sharing this launcher's registry, probe and commit path
    pub fn reconciler(&self, interval: Duration) -> Reconciler {
        Reconciler::new(
            self.registry.clone(),
            self.probe.clone(),
            self.sessions.clone(),
            self.clock.clone(),
            interval,
            self.launch_grace,
        )
    }

    pub fn list_running(&self) -> Vec<RunningGame> {
        self.registry.list_running()
    }

    /// Launch a game by id. Never panics on user or OS errors; the outcome
    /// carries a single message instead.
    ///
    /// Playtime of a direct Wine/Proton launch is the lifetime of the spawned
    /// wrapper (`wine`, `umu-run`), not of the game executable, so it can be
    /// off when the wrapper exits early or lingers.
    pub fn launch(&self, game_id: &str) -> LaunchOutcome {
        let result = self.try_launch(game_id);
        match &result {
            Ok(Some(pid)) => info!("Launched {} (pid {})", game_id, pid),
            Ok(None) => info!("Launched {} through the mod loader", game_id),
            Err(LaunchError::AlreadyRunning(_)) => {}
            Err(e) => warn!("Launch of {} failed: {}", game_id, e),
        }
        result.into()
    }

    /// Returns the supervised pid, or `None` for loader-mediated launches
    pub fn try_launch(&self, game_id: &str) -> Result<Option<u32>, LaunchError> {
        debug!("{}: {}", game_id, LaunchPhase::Validating);
        let game = self.store.load(game_id)?;
        validate_game(&game)?;
        let executable_name = game
            .executable_name()
            .ok_or_else(|| LaunchError::Validation("executable".to_string()))?;

        debug!("{}: {}", game_id, LaunchPhase::CollisionCheck);
        let probe = &self.probe;
        let admission = self
            .registry
            .admit(&game.id, self.launch_grace, || probe.probe(&executable_name));
        let (run_id, stale) = match admission {
            Admission::Admitted { run_id, stale } => (run_id, stale),
            Admission::AlreadyRunning => {
                info!("{} is already running", executable_name);
                return Err(LaunchError::AlreadyRunning(executable_name));
            }
        };
        let mut reservation = Reservation {
            registry: &self.registry,
            game_id: game.id.clone(),
            run_id,
            tracked: false,
        };

        if let Some(stale) = stale {
            info!("Previous session of {} is gone, committing it", game.id);
            self.sessions.finish(&stale, self.clock.now(), SessionEnd::Stale);
        }

        debug!("{}: {}", game_id, LaunchPhase::PreLaunch);
        run_pre_launch(self.shell.as_ref(), &game.launch.pre_launch)?;

        let profile = self.loader_profile(&game, &executable_name);
        debug!("{}: {}", game_id, LaunchPhase::Spawning);
        let (run, child) = match select_mode(game.mods.enabled, profile) {
            LaunchMode::Direct => {
                let (run, child) = self.spawn_direct(&game, &executable_name, run_id)?;
                (run, Some(child))
            }
            LaunchMode::Loader(profile) => {
                let run = self.spawn_with_loader(&game, &executable_name, run_id, profile)?;
                (run, None)
            }
        };

        let pid = run.supervised_pid;
        // Tracked before the watcher starts so a fast exit finds the run
        reservation.track(run);
        if let Some(child) = child {
            self.watch_exit(&game.id, run_id, child);
        }
        debug!("{}: {}", game_id, LaunchPhase::Tracked);
        Ok(pid)
    }

    /// Only consulted when mods are enabled. A game without a profile is
    /// launched directly.
    fn loader_profile(&self, game: &GameRecord, executable_name: &str) -> Option<LoaderProfile> {
        if !game.mods.enabled {
            return None;
        }
        let profile = pick_profile(
            game.mods.importer.as_deref(),
            self.profiles.as_ref(),
            executable_name,
        );
        if profile.is_none() {
            info!(
                "Mods are enabled for {} but no loader supports {}, launching without mods",
                game.id, executable_name
            );
        }
        profile
    }

    fn spawn_direct(
        &self,
        game: &GameRecord,
        executable_name: &str,
        run_id: RunId,
    ) -> Result<(TrackedRun, Box<dyn SupervisedProcess>), LaunchError> {
        let cmd = resolve(game, false);
        debug!("{}", format_launch_cmd(&cmd, &game.name));

        let child = self
            .spawner
            .spawn_detached(&cmd)
            .map_err(|source| LaunchError::Spawn {
                program: cmd.program.clone(),
                source,
            })?;
        let run = TrackedRun::new(run_id, &game.id, executable_name, Some(child.pid()), self.clock.now());
        Ok((run, child))
    }

    fn spawn_with_loader(
        &self,
        game: &GameRecord,
        executable_name: &str,
        run_id: RunId,
        profile: LoaderProfile,
    ) -> Result<TrackedRun, LaunchError> {
        let mut request = LoaderLaunchRequest::from_game(game, executable_name);
        request.importer = Some(profile.id().to_string());

        let launch = self.loader.launch_with_loader(&request)?;
        debug!(
            "Loader pid {} started {} with {}",
            launch.loader_pid, game.id, launch.profile
        );
        Ok(TrackedRun::new(run_id, &game.id, executable_name, None, launch.started_at))
    }

    /// Wait for the child on its own thread and commit the session when it exits
    fn watch_exit(&self, game_id: &str, run_id: RunId, mut child: Box<dyn SupervisedProcess>) {
        let registry = self.registry.clone();
        let sessions = self.sessions.clone();
        let clock = self.clock.clone();
        let owned_id = game_id.to_string();

        let spawned = std::thread::Builder::new()
            .name(format!("watch-{}", game_id))
            .spawn(move || {
                let code = match child.wait() {
                    Ok(code) => code,
                    Err(e) => {
                        // The reconciler ends the run once the executable is gone
                        warn!("Lost track of {} (pid {}): {}", owned_id, child.pid(), e);
                        return;
                    }
                };
                let ended_at = clock.now();
                debug!("{}: {}", owned_id, LaunchPhase::Terminating);
                match registry.evict(&owned_id, run_id) {
                    Some(eviction) => {
                        sessions.finish(&eviction, ended_at, SessionEnd::Exited(code));
                    }
                    None => debug!("Session of {} was already ended", owned_id),
                }
            });

        if let Err(e) = spawned {
            warn!("Could not watch {}: {}", game_id, e);
        }
    }

    /// Track installed games whose executable is already running, e.g. after
    /// the launcher restarted. Playtime for these counts from now.
    pub fn reattach(&self) -> usize {
        let games = match self.store.list() {
            Ok(games) => games,
            Err(e) => {
                warn!("Could not list games for re-attachment: {}", e);
                return 0;
            }
        };

        let mut attached = 0;
        for game in games.iter().filter(|g| g.installed) {
            let Some(executable_name) = game.executable_name() else {
                continue;
            };
            if !self.probe.is_running(&executable_name) {
                continue;
            }
            let now = self.clock.now();
            if self.registry.track_external(&game.id, &executable_name, now).is_some() {
                info!("{} is already running, tracking it", game.name);
                attached += 1;
            }
        }
        attached
    }
}
