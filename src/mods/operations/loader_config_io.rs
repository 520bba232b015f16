// Reading and writing the loader's JSON config

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::LaunchError;
use crate::mods::pure::apply_game_settings;

fn config_error(path: &Path, message: impl ToString) -> LaunchError {
    LaunchError::LoaderConfig {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// A missing file reads as an empty object
pub fn read_loader_config(path: &Path) -> Result<Value, LaunchError> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).map_err(|e| config_error(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Object(Default::default())),
        Err(e) => Err(config_error(path, e)),
    }
}

/// Pretty-printed, via a temp file so the loader never sees a partial write
pub fn write_loader_config(path: &Path, config: &Value) -> Result<(), LaunchError> {
    let text = serde_json::to_string_pretty(config).map_err(|e| config_error(path, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| config_error(path, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(|e| config_error(path, e))?;
    fs::rename(&tmp, path).map_err(|e| config_error(path, e))
}

/// Apply the game's settings; the file is only rewritten when they change it
pub fn update_loader_config(path: &Path, importer: &str, game_folder: &str) -> Result<bool, LaunchError> {
    let mut config = read_loader_config(path)?;
    if !apply_game_settings(&mut config, importer, game_folder) {
        debug!("Loader config already set up for {}", importer);
        return Ok(false);
    }
    write_loader_config(path, &config)?;
    info!("Updated loader config for {} ({})", importer, game_folder);
    Ok(true)
}
