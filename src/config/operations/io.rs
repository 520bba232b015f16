use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use tracing::warn;

use crate::config::types::AppConfig;
use crate::paths::PATH_CONFIG;

/// Load `config.yml` from the base directory
pub fn load_cfg() -> AppConfig {
    load_cfg_from(&PATH_CONFIG)
}

/// Load a config file, falling back to defaults if it is missing or broken
pub fn load_cfg_from(path: &Path) -> AppConfig {
    let Ok(file) = File::open(path) else {
        return AppConfig::default();
    };

    match serde_yaml::from_reader::<_, AppConfig>(BufReader::new(file)) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring unreadable config {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

pub fn save_cfg(config: &AppConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_yaml::to_writer(file, config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeBackend;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_cfg_from(&dir.path().join("config.yml")), AppConfig::default());
    }

    #[test]
    fn broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "tracking: [not, a, map").unwrap();
        assert_eq!(load_cfg_from(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.yml");

        let mut config = AppConfig::default();
        config.tracking.probe = ProbeBackend::Procfs;
        config.loader.prefix = "/prefixes/xxmi".to_string();
        save_cfg(&config, &path).unwrap();

        assert_eq!(load_cfg_from(&path), config);
    }
}
