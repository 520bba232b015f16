//! Lock-guarded registry of running games
//!
//! One mutex serializes the sequencer's collision check and insert, the
//! exit watchers' removals and the reconciler's evictions. Removals are keyed
//! by run id, so whoever removes a run first owns its commit and later
//! attempts for the same run are no-ops.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::error::ProbeError;

use super::types::{RunId, RunningGame, Slot, TrackedRun};

#[derive(Default)]
struct RegistryState {
    slots: HashMap<String, Slot>,
    next_run_id: RunId,
    /// Evicted runs whose commit has not finished yet
    finishing: usize,
    shutdown: bool,
}

impl RegistryState {
    fn has_tracked(&self) -> bool {
        self.slots.values().any(|slot| matches!(slot, Slot::Tracked(_)))
    }

    fn take_run_id(&mut self) -> RunId {
        self.next_run_id += 1;
        self.next_run_id
    }
}

/// Outcome of the collision check for a launch request
pub enum Admission<'a> {
    /// A reservation was inserted for `run_id`. `stale` holds an older run of
    /// the same game that was found dead and must be committed by the caller.
    Admitted {
        run_id: RunId,
        stale: Option<Eviction<'a>>,
    },
    AlreadyRunning,
}

/// A run removed from the registry. The holder commits its session; the
/// registry counts it as in flight until the guard is dropped.
pub struct Eviction<'a> {
    registry: &'a RunRegistry,
    run: TrackedRun,
}

impl Deref for Eviction<'_> {
    type Target = TrackedRun;

    fn deref(&self) -> &TrackedRun {
        &self.run
    }
}

impl Drop for Eviction<'_> {
    fn drop(&mut self) {
        let mut state = self.registry.lock();
        state.finishing = state.finishing.saturating_sub(1);
        self.registry.changed.notify_all();
    }
}

enum Existing {
    Free,
    Busy,
    Aged,
}

pub struct RunRegistry {
    state: Mutex<RegistryState>,
    changed: Condvar,
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RunRegistry {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Collision check and reservation under a single lock acquisition.
    ///
    /// A reservation, or a tracked run younger than `grace`, blocks the launch
    /// outright. An older tracked run blocks it unless `probe` conclusively
    /// reports the executable gone, in which case that run is evicted and
    /// handed back as stale. With no slot at all, a running executable (an
    /// instance we did not start) blocks; a failed probe does not.
    pub fn admit<F>(&self, game_id: &str, grace: Duration, probe: F) -> Admission<'_>
    where
        F: FnOnce() -> Result<bool, ProbeError>,
    {
        let mut state = self.lock();

        let existing = match state.slots.get(game_id) {
            None => Existing::Free,
            Some(Slot::Reserved { .. }) => Existing::Busy,
            Some(Slot::Tracked(run)) if run.registered_at.elapsed() < grace => Existing::Busy,
            Some(Slot::Tracked(_)) => Existing::Aged,
        };

        let mut stale = None;
        match existing {
            Existing::Busy => return Admission::AlreadyRunning,
            Existing::Free => {
                if matches!(probe(), Ok(true)) {
                    return Admission::AlreadyRunning;
                }
            }
            Existing::Aged => {
                if !matches!(probe(), Ok(false)) {
                    return Admission::AlreadyRunning;
                }
                if let Some(Slot::Tracked(run)) = state.slots.remove(game_id) {
                    state.finishing += 1;
                    stale = Some(run);
                }
            }
        }

        let run_id = state.take_run_id();
        state
            .slots
            .insert(game_id.to_string(), Slot::Reserved { run_id });

        Admission::Admitted {
            run_id,
            stale: stale.map(|run| Eviction { registry: self, run }),
        }
    }

    /// Turn the reservation for `run.run_id` into a tracked run.
    ///
    /// Returns false if the reservation is gone, which only happens when the
    /// launch was already released.
    pub fn activate(&self, run: TrackedRun) -> bool {
        let mut state = self.lock();
        match state.slots.get(&run.game_id) {
            Some(Slot::Reserved { run_id }) if *run_id == run.run_id => {}
            _ => return false,
        }
        state.slots.insert(run.game_id.clone(), Slot::Tracked(run));
        self.changed.notify_all();
        true
    }

    /// Drop a reservation after a failed launch
    pub fn release(&self, game_id: &str, run_id: RunId) {
        let mut state = self.lock();
        if matches!(state.slots.get(game_id), Some(Slot::Reserved { run_id: r }) if *r == run_id) {
            state.slots.remove(game_id);
            self.changed.notify_all();
        }
    }

    /// Remove a tracked run if it is still the same run instance
    pub fn evict(&self, game_id: &str, run_id: RunId) -> Option<Eviction<'_>> {
        let mut state = self.lock();
        if !matches!(state.slots.get(game_id), Some(Slot::Tracked(run)) if run.run_id == run_id) {
            return None;
        }
        let Some(Slot::Tracked(run)) = state.slots.remove(game_id) else {
            return None;
        };
        state.finishing += 1;
        self.changed.notify_all();
        Some(Eviction { registry: self, run })
    }

    /// Track a game found running that this launcher did not start (e.g.
    /// after a restart). No-op if the game already has a slot.
    pub fn track_external(
        &self,
        game_id: &str,
        watched_executable: &str,
        started_at: DateTime<Utc>,
    ) -> Option<RunId> {
        let mut state = self.lock();
        if state.slots.contains_key(game_id) {
            return None;
        }
        let run_id = state.take_run_id();
        let run = TrackedRun::new(run_id, game_id, watched_executable, None, started_at);
        state.slots.insert(game_id.to_string(), Slot::Tracked(run));
        self.changed.notify_all();
        Some(run_id)
    }

    pub fn mark_verified(&self, game_id: &str, run_id: RunId, at: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        match state.slots.get_mut(game_id) {
            Some(Slot::Tracked(run)) if run.run_id == run_id => {
                run.last_verified_at = at;
                true
            }
            _ => false,
        }
    }

    /// Copies of every tracked run (reservations excluded)
    pub fn snapshot(&self) -> Vec<TrackedRun> {
        let state = self.lock();
        let mut runs: Vec<TrackedRun> = state
            .slots
            .values()
            .filter_map(|slot| match slot {
                Slot::Tracked(run) => Some(run.clone()),
                Slot::Reserved { .. } => None,
            })
            .collect();
        runs.sort_by(|a, b| a.game_id.cmp(&b.game_id));
        runs
    }

    pub fn get(&self, game_id: &str) -> Option<TrackedRun> {
        match self.lock().slots.get(game_id) {
            Some(Slot::Tracked(run)) => Some(run.clone()),
            _ => None,
        }
    }

    pub fn list_running(&self) -> Vec<RunningGame> {
        self.snapshot().iter().map(RunningGame::from).collect()
    }

    /// True when no slot (reserved or tracked) exists
    pub fn is_empty(&self) -> bool {
        self.lock().slots.is_empty()
    }

    /// Park until at least one run is tracked. Returns false on shutdown.
    pub fn wait_for_runs(&self) -> bool {
        let state = self.lock();
        let state = self
            .changed
            .wait_while(state, |s| !s.shutdown && !s.has_tracked())
            .unwrap_or_else(PoisonError::into_inner);
        !state.shutdown
    }

    /// Sleep for `interval` unless shut down first. Returns false on shutdown.
    pub fn sleep(&self, interval: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .changed
            .wait_timeout_while(state, interval, |s| !s.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        !state.shutdown
    }

    pub fn shutdown(&self) {
        self.lock().shutdown = true;
        self.changed.notify_all();
    }

    /// Block until nothing is tracked or reserved and no commit is in flight.
    /// Returns false if `timeout` ran out first.
    pub fn wait_until_idle(&self, timeout: Option<Duration>) -> bool {
        let busy = |s: &mut RegistryState| !s.slots.is_empty() || s.finishing > 0;
        let state = self.lock();
        match timeout {
            None => {
                let _state = self
                    .changed
                    .wait_while(state, busy)
                    .unwrap_or_else(PoisonError::into_inner);
                true
            }
            Some(timeout) => {
                let (_state, result) = self
                    .changed
                    .wait_timeout_while(state, timeout, busy)
                    .unwrap_or_else(PoisonError::into_inner);
                !result.timed_out()
            }
        }
    }
}
