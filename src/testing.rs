//! In-memory stand-ins for the launcher's collaborators

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};

use crate::clock::Clock;
use crate::error::{InstallError, LaunchError, ProbeError, StoreError};
use crate::game::{GameRecord, GameStore};
use crate::launch::{LaunchCommand, ProcessSpawner, ShellRunner, SupervisedProcess};
use crate::mods::{
    CompatRuntime, LoaderLaunch, LoaderLaunchRequest, LoaderLauncher, LoaderProfile,
    PackageInstaller, PackageKind, RunnerLocator,
};
use crate::process::{ProcessProbe, StaleProcessKiller};

// ── store ──

#[derive(Default)]
pub struct MemoryStore {
    games: Mutex<BTreeMap<String, GameRecord>>,
}

impl MemoryStore {
    pub fn with_games(games: impl IntoIterator<Item = GameRecord>) -> Self {
        Self {
            games: Mutex::new(games.into_iter().map(|g| (g.id.clone(), g)).collect()),
        }
    }

    pub fn get(&self, id: &str) -> Option<GameRecord> {
        self.games.lock().unwrap().get(id).cloned()
    }
}

impl GameStore for MemoryStore {
    fn load(&self, id: &str) -> Result<GameRecord, StoreError> {
        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&self, game: &GameRecord) -> Result<(), StoreError> {
        self.games.lock().unwrap().insert(game.id.clone(), game.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.games.lock().unwrap().values().cloned().collect())
    }
}

// ── shell ──

#[derive(Default)]
pub struct RecordingShell {
    ran: Mutex<Vec<String>>,
    failures: HashMap<String, i32>,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, command: &str, code: i32) -> Self {
        self.failures.insert(command.to_string(), code);
        self
    }

    pub fn ran(&self) -> Vec<String> {
        self.ran.lock().unwrap().clone()
    }
}

impl ShellRunner for RecordingShell {
    fn run(&self, command: &str) -> io::Result<Option<i32>> {
        self.ran.lock().unwrap().push(command.to_string());
        Ok(Some(self.failures.get(command).copied().unwrap_or(0)))
    }
}

// ── clock ──

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2026, 1, 15, 20, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ── probe ──

/// Scripted answers per executable name; once a script runs out, the
/// steady state set by `set_running` applies (default: not running)
#[derive(Default)]
pub struct FakeProbe {
    scripts: Mutex<HashMap<String, VecDeque<Result<bool, ProbeError>>>>,
    running: Mutex<HashMap<String, bool>>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, name: &str, answers: impl IntoIterator<Item = Result<bool, ProbeError>>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(name.to_lowercase())
            .or_default()
            .extend(answers);
    }

    pub fn set_running(&self, name: &str, running: bool) {
        self.running.lock().unwrap().insert(name.to_lowercase(), running);
    }
}

impl ProcessProbe for FakeProbe {
    fn list_matching_pids(&self, executable_name: &str) -> Result<Vec<u32>, ProbeError> {
        let key = executable_name.to_lowercase();
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        let running = match scripted {
            Some(answer) => answer?,
            None => self.running.lock().unwrap().get(&key).copied().unwrap_or(false),
        };
        Ok(if running { vec![4242] } else { Vec::new() })
    }
}

#[derive(Default)]
pub struct RecordingKiller {
    killed: Mutex<Vec<String>>,
}

impl RecordingKiller {
    pub fn killed(&self) -> Vec<String> {
        self.killed.lock().unwrap().clone()
    }
}

impl StaleProcessKiller for RecordingKiller {
    fn kill_matching(&self, executable_name: &str) {
        self.killed.lock().unwrap().push(executable_name.to_string());
    }
}

// ── spawner ──

/// Hands out children that exit when the test calls `exit(pid, code)`.
/// Children still running when the spawner is dropped report a signal exit.
pub struct FakeSpawner {
    delay: Duration,
    next_pid: Mutex<u32>,
    spawned: Mutex<Vec<LaunchCommand>>,
    exits: Mutex<HashMap<u32, Sender<Option<i32>>>>,
    fail_next: Mutex<Option<String>>,
}

struct FakeChild {
    pid: u32,
    exit: Receiver<Option<i32>>,
}

impl SupervisedProcess for FakeChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn wait(&mut self) -> io::Result<Option<i32>> {
        Ok(self.exit.recv().unwrap_or(None))
    }
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            next_pid: Mutex::new(1000),
            spawned: Mutex::new(Vec::new()),
            exits: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Every spawn takes this long, as a slow Proton start-up would
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock().unwrap() = Some(message.to_string());
    }

    pub fn spawned(&self) -> Vec<LaunchCommand> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn last_pid(&self) -> Option<u32> {
        let next = *self.next_pid.lock().unwrap();
        (next > 1000).then(|| next - 1)
    }

    pub fn exit(&self, pid: u32, code: Option<i32>) {
        if let Some(tx) = self.exits.lock().unwrap().remove(&pid) {
            let _ = tx.send(code);
        }
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn_detached(&self, cmd: &LaunchCommand) -> io::Result<Box<dyn SupervisedProcess>> {
        std::thread::sleep(self.delay);
        if let Some(message) = self.fail_next.lock().unwrap().take() {
            return Err(io::Error::new(io::ErrorKind::NotFound, message));
        }

        let pid = {
            let mut next = self.next_pid.lock().unwrap();
            let pid = *next;
            *next += 1;
            pid
        };
        let (tx, rx) = channel();
        self.exits.lock().unwrap().insert(pid, tx);
        self.spawned.lock().unwrap().push(cmd.clone());
        Ok(Box::new(FakeChild { pid, exit: rx }))
    }
}

// ── mod loader ──

pub struct FakeLoader {
    clock: Arc<ManualClock>,
    requests: Mutex<Vec<LoaderLaunchRequest>>,
    unsupported: bool,
}

impl FakeLoader {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            requests: Mutex::new(Vec::new()),
            unsupported: false,
        }
    }

    /// Rejects every request with `UnsupportedGame`
    pub fn unsupported(mut self) -> Self {
        self.unsupported = true;
        self
    }

    pub fn requests(&self) -> Vec<LoaderLaunchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl LoaderLauncher for FakeLoader {
    fn launch_with_loader(&self, request: &LoaderLaunchRequest) -> Result<LoaderLaunch, LaunchError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.unsupported {
            return Err(LaunchError::UnsupportedGame(request.executable_name.clone()));
        }
        Ok(LoaderLaunch {
            loader_pid: 4242,
            started_at: self.clock.now(),
            profile: LoaderProfile::new(request.importer.clone().unwrap_or_default()),
        })
    }
}

pub struct FakeInstaller {
    loader_installed: Mutex<bool>,
    runtime_installed: bool,
    failure: Option<String>,
    requested: Mutex<Vec<PackageKind>>,
}

impl FakeInstaller {
    pub fn installed() -> Self {
        Self {
            loader_installed: Mutex::new(true),
            runtime_installed: true,
            failure: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn missing() -> Self {
        let installer = Self::installed();
        *installer.loader_installed.lock().unwrap() = false;
        installer
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn runtime_missing(mut self) -> Self {
        self.runtime_installed = false;
        self
    }

    pub fn requested(&self) -> Vec<PackageKind> {
        self.requested.lock().unwrap().clone()
    }
}

impl PackageInstaller for FakeInstaller {
    fn is_installed(&self, kind: PackageKind) -> bool {
        match kind {
            PackageKind::Loader => *self.loader_installed.lock().unwrap(),
            PackageKind::Runtime => self.runtime_installed,
        }
    }

    fn ensure_installed(&self, kind: PackageKind, progress: &dyn Fn(u8)) -> Result<(), InstallError> {
        self.requested.lock().unwrap().push(kind);
        progress(0);
        if let Some(message) = &self.failure {
            return Err(InstallError::Failed {
                kind,
                message: message.clone(),
            });
        }
        if kind == PackageKind::Runtime && !self.runtime_installed {
            return Err(InstallError::NotInstalled {
                kind,
                expected: PathBuf::from("/runners"),
            });
        }
        if kind == PackageKind::Loader {
            *self.loader_installed.lock().unwrap() = true;
        }
        progress(100);
        Ok(())
    }
}

/// Runtimes at fixed roots, no filesystem checks
pub struct FakeRunners {
    roots: Vec<PathBuf>,
}

impl FakeRunners {
    pub fn with(roots: &[&str]) -> Self {
        Self {
            roots: roots.iter().map(PathBuf::from).collect(),
        }
    }

    fn runtime(root: &PathBuf) -> CompatRuntime {
        CompatRuntime {
            name: root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            root: root.clone(),
        }
    }
}

impl RunnerLocator for FakeRunners {
    fn locate(&self, preferred: &str) -> Option<CompatRuntime> {
        let runtimes = self.roots.iter().map(Self::runtime);
        match preferred.trim() {
            "" => runtimes.into_iter().next(),
            path if path.starts_with('/') => runtimes.into_iter().find(|r| r.root == PathBuf::from(path)),
            name => runtimes.into_iter().find(|r| r.name.eq_ignore_ascii_case(name)),
        }
    }
}
