//! Error types shared across the launcher

use std::path::PathBuf;

use thiserror::Error;

use crate::mods::PackageKind;

/// Failure of a launch request. Every variant carries a message fit for
/// showing the user as-is.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Game not found: {0}")]
    NotFound(String),

    #[error("Game is missing required launch fields: {0}")]
    Validation(String),

    #[error("{0} is already running")]
    AlreadyRunning(String),

    #[error("Pre-launch command failed: {command}")]
    PreLaunchFailed { command: String, code: Option<i32> },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No mod-loader profile found for {0}; launch it with mods disabled")]
    UnsupportedGame(String),

    #[error("No compatibility runtime found; install a Proton build into {}", .0.display())]
    MissingRunner(PathBuf),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error("Failed to update loader config {}: {message}", .path.display())]
    LoaderConfig { path: PathBuf, message: String },

    #[error("Game library error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LaunchError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => LaunchError::NotFound(id),
            other => LaunchError::Store(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no game with id {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A process-list query that could not be answered. Never means "not running".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to query process list: {0}")]
    Query(#[from] std::io::Error),

    #[error("process query exited abnormally: {0}")]
    Status(String),
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{kind} is not installed (expected at {})", .expected.display())]
    NotInstalled { kind: PackageKind, expected: PathBuf },

    #[error("Failed to install {kind}: {message}")]
    Failed { kind: PackageKind, message: String },
}
