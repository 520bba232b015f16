//! Launch type definitions

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use serde::Serialize;

use crate::error::LaunchError;

/// A fully resolved command line, independent of `std::process::Command` so it
/// can be built, compared and logged without side effects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Overlay on top of the parent environment
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl LaunchCommand {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(&self.env);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Result of `Launcher::launch`, shaped for the rest of the application:
/// either a pid (absent for loader-mediated launches) or one error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaunchOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<Option<u32>, LaunchError>> for LaunchOutcome {
    fn from(result: Result<Option<u32>, LaunchError>) -> Self {
        match result {
            Ok(pid) => LaunchOutcome {
                success: true,
                pid,
                error: None,
            },
            Err(e) => LaunchOutcome {
                success: false,
                pid: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Steps a launch request goes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchPhase {
    Validating,
    CollisionCheck,
    PreLaunch,
    Spawning,
    Tracked,
    Terminating,
}

impl fmt::Display for LaunchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LaunchPhase::Validating => "validating",
            LaunchPhase::CollisionCheck => "collision-check",
            LaunchPhase::PreLaunch => "pre-launch",
            LaunchPhase::Spawning => "spawning",
            LaunchPhase::Tracked => "tracked",
            LaunchPhase::Terminating => "terminating",
        };
        f.write_str(name)
    }
}
