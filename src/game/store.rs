//! Game record persistence
//!
//! Each game lives in its own YAML file inside the games directory. New
//! records are written to `<slug>.yml`; existing ones go back to the file
//! they were read from, whatever its name.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StoreError;

use super::types::GameRecord;

/// Load/save access to game records. Implementations must be callable from
/// the exit-watcher and reconciliation threads.
pub trait GameStore: Send + Sync {
    fn load(&self, id: &str) -> Result<GameRecord, StoreError>;
    fn save(&self, game: &GameRecord) -> Result<(), StoreError>;
    fn list(&self) -> Result<Vec<GameRecord>, StoreError>;
}

pub struct YamlGameStore {
    dir: PathBuf,
}

impl YamlGameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "yml" || ext == "yaml")
            })
            .collect();
        files.sort();
        Ok(files)
    }

    fn read_record(path: &Path) -> Result<GameRecord, StoreError> {
        let file = File::open(path)?;
        Ok(serde_yaml::from_reader(BufReader::new(file))?)
    }

    /// First record file (in name order) holding `id`
    fn find(&self, id: &str) -> Result<Option<(PathBuf, GameRecord)>, StoreError> {
        for path in self.record_files()? {
            match Self::read_record(&path) {
                Ok(game) if game.id == id => return Ok(Some((path, game))),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable game record {}: {}", path.display(), e),
            }
        }
        Ok(None)
    }
}

impl GameStore for YamlGameStore {
    fn load(&self, id: &str) -> Result<GameRecord, StoreError> {
        self.find(id)?
            .map(|(_, game)| game)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&self, game: &GameRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;

        // A changed slug moves the record to its new canonical file
        let existing = self.find(&game.id)?;
        let path = match &existing {
            Some((path, stored)) if stored.slug == game.slug => path.clone(),
            _ => self.dir.join(format!("{}.yml", game.file_stem())),
        };
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.yml", game.file_stem()));
        let tmp = self.dir.join(format!(".{}.tmp", file_name));

        let content = serde_yaml::to_string(game)?;
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &path)?;

        if let Some((old, _)) = existing
            && old != path
        {
            fs::remove_file(&old)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<GameRecord>, StoreError> {
        let mut games = Vec::new();
        for path in self.record_files()? {
            match Self::read_record(&path) {
                Ok(game) => games.push(game),
                Err(e) => warn!("Skipping unreadable game record {}: {}", path.display(), e),
            }
        }
        games.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(games)
    }
}
