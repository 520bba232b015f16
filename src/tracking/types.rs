//! Run tracking type definitions

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identifies one run instance; a game launched twice gets two ids
pub type RunId = u64;

/// A game the launcher believes is running
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedRun {
    pub run_id: RunId,
    pub game_id: String,
    /// Executable base name matched against process command lines
    pub watched_executable: String,
    /// Pid of the process we spawned and wait on. `None` for loader-mediated
    /// and re-attached runs, which only the reconciler can end.
    pub supervised_pid: Option<u32>,
    pub started_at: DateTime<Utc>,
    pub last_verified_at: DateTime<Utc>,
    /// When the run entered the registry, for the collision grace window
    pub registered_at: Instant,
}

impl TrackedRun {
    pub fn new(
        run_id: RunId,
        game_id: &str,
        watched_executable: &str,
        supervised_pid: Option<u32>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            game_id: game_id.to_string(),
            watched_executable: watched_executable.to_string(),
            supervised_pid,
            started_at,
            last_verified_at: started_at,
            registered_at: Instant::now(),
        }
    }

    /// Hours between start and `ended_at`; never negative
    pub fn session_hours(&self, ended_at: DateTime<Utc>) -> f64 {
        let millis = (ended_at - self.started_at).num_milliseconds().max(0);
        millis as f64 / 3_600_000.0
    }
}

/// Public view of a tracked run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningGame {
    pub game_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl From<&TrackedRun> for RunningGame {
    fn from(run: &TrackedRun) -> Self {
        Self {
            game_id: run.game_id.clone(),
            started_at: run.started_at,
            pid: run.supervised_pid,
        }
    }
}

/// Registry entry: a launch in progress holds a reservation until its
/// process is up, then becomes a tracked run
#[derive(Debug, Clone)]
pub(crate) enum Slot {
    Reserved { run_id: RunId },
    Tracked(TrackedRun),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn session_hours_from_wall_clock_delta() {
        let start = Utc::now();
        let run = TrackedRun::new(1, "g", "Game.exe", Some(42), start);
        assert_eq!(run.session_hours(start + Duration::minutes(90)), 1.5);
    }

    #[test]
    fn session_hours_clamps_clock_skew() {
        let start = Utc::now();
        let run = TrackedRun::new(1, "g", "Game.exe", None, start);
        assert_eq!(run.session_hours(start - Duration::seconds(5)), 0.0);
    }

    #[test]
    fn running_view_serializes_camel_case() {
        let run = TrackedRun::new(1, "g1", "Game.exe", None, Utc::now());
        let json = serde_json::to_value(RunningGame::from(&run)).unwrap();
        assert!(json.get("gameId").is_some());
        assert!(json.get("startedAt").is_some());
        assert!(json.get("pid").is_none());
    }
}
