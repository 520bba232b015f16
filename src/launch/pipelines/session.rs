// Session end: playtime commit and post-launch hooks

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::game::GameStore;
use crate::launch::operations::{run_post_launch, ShellRunner};
use crate::tracking::TrackedRun;

/// How a run was found to be over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The supervised process exited (code absent when killed by a signal)
    Exited(Option<i32>),
    /// The reconciler no longer sees the watched executable
    ProcessGone,
    /// Found dead by the collision check of a new launch
    Stale,
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEnd::Exited(Some(code)) => write!(f, "exited with {}", code),
            SessionEnd::Exited(None) => f.write_str("terminated by signal"),
            SessionEnd::ProcessGone => f.write_str("process gone"),
            SessionEnd::Stale => f.write_str("stale"),
        }
    }
}

/// Commits a finished run. Callers must own the run's eviction, which
/// guarantees each run reaches here at most once.
pub struct SessionCommitter {
    store: Arc<dyn GameStore>,
    shell: Arc<dyn ShellRunner>,
}

impl SessionCommitter {
    pub fn new(store: Arc<dyn GameStore>, shell: Arc<dyn ShellRunner>) -> Self {
        Self { store, shell }
    }

    /// Add the session to the game's playtime, stamp `lastPlayed`, then run
    /// post-launch commands. Returns the hours committed, or `None` if the
    /// record could not be updated (hooks still run when the record loads).
    pub fn finish(&self, run: &TrackedRun, ended_at: DateTime<Utc>, end: SessionEnd) -> Option<f64> {
        let hours = run.session_hours(ended_at);
        info!(
            "Session of {} ended ({}) after {:.3}h",
            run.game_id, end, hours
        );

        // Reload so edits made while the game ran are not overwritten
        let mut game = match self.store.load(&run.game_id) {
            Ok(game) => game,
            Err(e) => {
                warn!("Could not load {} to record playtime: {}", run.game_id, e);
                return None;
            }
        };

        game.playtime += hours;
        game.last_played = Some(ended_at);

        let committed = match self.store.save(&game) {
            Ok(()) => Some(hours),
            Err(e) => {
                warn!("Could not save playtime for {}: {}", run.game_id, e);
                None
            }
        };

        run_post_launch(self.shell.as_ref(), &game.launch.post_launch);
        committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::sample_game;
    use crate::game::{RunnerKind, YamlGameStore};
    use crate::testing::{MemoryStore, RecordingShell};
    use chrono::Duration;

    fn committer(store: &Arc<MemoryStore>, shell: &Arc<RecordingShell>) -> SessionCommitter {
        SessionCommitter::new(store.clone(), shell.clone())
    }

    #[test]
    fn finish_adds_hours_and_stamps_last_played() {
        let mut game = sample_game("g1", RunnerKind::Native);
        game.playtime = 1.25;
        let store = Arc::new(MemoryStore::with_games([game]));
        let shell = Arc::new(RecordingShell::new());

        let start = Utc::now();
        let end = start + Duration::minutes(30);
        let run = TrackedRun::new(1, "g1", "Endfield.exe", Some(7), start);

        let hours = committer(&store, &shell).finish(&run, end, SessionEnd::Exited(Some(0)));
        assert_eq!(hours, Some(0.5));

        let saved = store.get("g1").unwrap();
        assert_eq!(saved.playtime, 1.75);
        assert_eq!(saved.last_played, Some(end));
    }

    #[test]
    fn finish_runs_post_launch_after_save() {
        let mut game = sample_game("g1", RunnerKind::Native);
        game.launch.post_launch = vec!["umount /mnt/games".to_string(), "notify".to_string()];
        let store = Arc::new(MemoryStore::with_games([game]));
        let shell = Arc::new(RecordingShell::new().failing("umount /mnt/games", 1));

        let run = TrackedRun::new(1, "g1", "Endfield.exe", None, Utc::now());
        committer(&store, &shell).finish(&run, Utc::now(), SessionEnd::ProcessGone);

        assert_eq!(shell.ran(), vec!["umount /mnt/games", "notify"]);
    }

    #[test]
    fn finish_uses_fresh_record() {
        let store = Arc::new(MemoryStore::with_games([sample_game("g1", RunnerKind::Native)]));
        let shell = Arc::new(RecordingShell::new());
        let start = Utc::now();
        let run = TrackedRun::new(1, "g1", "Endfield.exe", None, start);

        // renamed while the game was running
        let mut edited = store.get("g1").unwrap();
        edited.name = "Arknights: Endfield".to_string();
        store.save(&edited).unwrap();

        committer(&store, &shell).finish(&run, start + Duration::hours(1), SessionEnd::Stale);
        let saved = store.get("g1").unwrap();
        assert_eq!(saved.name, "Arknights: Endfield");
        assert_eq!(saved.playtime, 1.0);
    }

    #[test]
    fn commits_to_yaml_record_keep_user_keys_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("endfield.yaml");
        std::fs::write(
            &path,
            "id: g1\nname: Endfield\nslug: endfield\nexecutable: /games/Endfield.exe\n\
             year: 2025\nmods:\n  enabled: false\n  fpsUnlock: 120\nplaytime: 1.0\n",
        )
        .unwrap();
        let store = Arc::new(YamlGameStore::new(dir.path()));
        let shell = Arc::new(RecordingShell::new());
        let sessions = SessionCommitter::new(store.clone(), shell);

        let start = Utc::now();
        for session in 0..2 {
            let begin = start + Duration::hours(session * 3);
            let run = TrackedRun::new(1 + session as u64, "g1", "Endfield.exe", Some(7), begin);
            let hours = sessions.finish(&run, begin + Duration::hours(1), SessionEnd::Exited(Some(0)));
            assert_eq!(hours, Some(1.0));
        }

        let saved = store.load("g1").unwrap();
        assert_eq!(saved.playtime, 3.0);
        assert_eq!(saved.extra.get("year").and_then(|v| v.as_u64()), Some(2025));
        assert_eq!(saved.mods.extra.get("fpsUnlock").and_then(|v| v.as_u64()), Some(120));
        assert!(!dir.path().join("endfield.yml").exists());
    }

    #[test]
    fn finish_on_deleted_game_is_logged_only() {
        let store = Arc::new(MemoryStore::default());
        let shell = Arc::new(RecordingShell::new());
        let run = TrackedRun::new(1, "gone", "Game.exe", None, Utc::now());

        assert_eq!(committer(&store, &shell).finish(&run, Utc::now(), SessionEnd::ProcessGone), None);
        assert!(shell.ran().is_empty());
    }
}
