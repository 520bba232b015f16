use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::game::GameRecord;

/// A loader importer id such as `EFMI` or `GIMI`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoaderProfile {
    id: String,
}

impl LoaderProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for LoaderProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Third-party packages the loader path depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Loader,
    Runtime,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageKind::Loader => f.write_str("XXMI Launcher"),
            PackageKind::Runtime => f.write_str("Proton runtime"),
        }
    }
}

/// Everything the loader bridge needs from a game record
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderLaunchRequest {
    pub executable_name: String,
    pub game_directory: PathBuf,
    pub runner_path: String,
    pub prefix: String,
    /// Importer pinned on the game record, overriding the lookup table
    pub importer: Option<String>,
}

impl LoaderLaunchRequest {
    pub fn from_game(game: &GameRecord, executable_name: &str) -> Self {
        Self {
            executable_name: executable_name.to_string(),
            game_directory: game.working_dir().unwrap_or_default(),
            runner_path: game.runner.path.clone(),
            prefix: game.runner.prefix.clone(),
            importer: game.mods.importer.clone(),
        }
    }
}

/// A loader process that started and survived its startup grace
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderLaunch {
    pub loader_pid: u32,
    pub started_at: DateTime<Utc>,
    pub profile: LoaderProfile,
}
