// Background reconciliation of tracked runs against the process list

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::launch::{SessionCommitter, SessionEnd};
use crate::process::ProcessProbe;

use super::registry::RunRegistry;

/// Re-probes every tracked run and ends the ones whose executable is gone.
///
/// This is the only way loader-mediated and re-attached runs ever end, and a
/// fallback for direct runs whose exit notification never arrives. A run
/// younger than the launch grace is never ended for being absent: the loader
/// returns before the game shows up in the process list.
pub struct Reconciler {
    registry: Arc<RunRegistry>,
    probe: Arc<dyn ProcessProbe>,
    sessions: Arc<SessionCommitter>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    launch_grace: Duration,
}

impl Reconciler {
    pub fn new(
        registry: Arc<RunRegistry>,
        probe: Arc<dyn ProcessProbe>,
        sessions: Arc<SessionCommitter>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        launch_grace: Duration,
    ) -> Self {
        Self {
            registry,
            probe,
            sessions,
            clock,
            interval,
            launch_grace,
        }
    }

    /// One reconciliation pass. Probing happens outside the registry lock.
    /// Returns the number of runs ended.
    pub fn tick(&self, now: DateTime<Utc>) -> usize {
        let mut ended = 0;

        for run in self.registry.snapshot() {
            match self.probe.probe(&run.watched_executable) {
                Ok(true) => {
                    self.registry.mark_verified(&run.game_id, run.run_id, now);
                }
                Ok(false) if run.registered_at.elapsed() < self.launch_grace => {
                    debug!("{} not visible yet, still starting", run.watched_executable);
                }
                Ok(false) => {
                    // Someone else (exit watcher, new launch) may have won the race
                    let Some(eviction) = self.registry.evict(&run.game_id, run.run_id) else {
                        continue;
                    };
                    info!(
                        "{} is no longer running, ending session of {}",
                        eviction.watched_executable, eviction.game_id
                    );
                    self.sessions.finish(&eviction, now, SessionEnd::ProcessGone);
                    ended += 1;
                }
                Err(e) => {
                    debug!("Probe for {} inconclusive: {}", run.watched_executable, e);
                }
            }
        }

        ended
    }

    /// Run the loop on its own thread until `RunRegistry::shutdown`.
    /// The thread parks while nothing is tracked.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("reconciler".to_string())
            .spawn(move || {
                info!("Reconciler started ({:?} interval)", self.interval);
                while self.registry.wait_for_runs() {
                    if !self.registry.sleep(self.interval) {
                        break;
                    }
                    self.tick(self.clock.now());
                }
                info!("Reconciler stopped");
            })
            .inspect_err(|e| warn!("Failed to start reconciler thread: {}", e))
    }
}
