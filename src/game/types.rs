use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    Native,
    Wine,
    #[default]
    Proton,
}

impl RunnerKind {
    pub fn is_native(&self) -> bool {
        *self == RunnerKind::Native
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    #[serde(rename = "type")]
    pub kind: RunnerKind,
    /// Wine binary or Proton directory; unused for native games
    #[serde(default)]
    pub path: String,
    /// Wine prefix; unused for native games
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    /// Extra environment, applied over the runner defaults
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub pre_launch: Vec<String>,
    #[serde(default)]
    pub post_launch: Vec<String>,
    /// Whitespace-separated extra arguments
    #[serde(default)]
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ModConfig {
    /// User wants the mod loader for this game
    #[serde(default)]
    pub enabled: bool,
    /// Pin a loader importer (e.g. "EFMI") instead of guessing from the executable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importer: Option<String>,
    /// Keys this launcher does not model (e.g. `xxmi`, `fpsUnlock`), written back as-is
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A library entry as stored in `games/<slug>.yml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub installed: bool,
    /// Working directory for the game process
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub executable: String,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub mods: ModConfig,
    /// Hours
    #[serde(default)]
    pub playtime: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Utc>>,
    /// Keys this launcher does not model (e.g. `year`, `update`), written back as-is
    #[serde(flatten)]
    pub extra: Mapping,
}

impl GameRecord {
    /// Base filename of the executable, used to find the game in the process list.
    ///
    /// Splits on both separators since Windows-style paths show up in imported records.
    pub fn executable_name(&self) -> Option<String> {
        self.executable
            .trim()
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// Directory the game should run in: the configured one, else the executable's parent
    pub fn working_dir(&self) -> Option<PathBuf> {
        if !self.directory.trim().is_empty() {
            return Some(PathBuf::from(self.directory.trim()));
        }
        Path::new(self.executable.trim())
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    }

    /// File stem used for the record's YAML file
    pub fn file_stem(&self) -> String {
        if self.slug.is_empty() {
            self.id.clone()
        } else {
            self.slug.clone()
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_game(id: &str, kind: RunnerKind) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        name: format!("Game {}", id),
        slug: id.to_string(),
        installed: true,
        directory: "/games/endfield".to_string(),
        executable: "/games/endfield/Endfield.exe".to_string(),
        runner: RunnerConfig {
            kind,
            path: "/runners/GE-Proton10-14".to_string(),
            prefix: "/prefixes/endfield".to_string(),
        },
        launch: LaunchConfig::default(),
        mods: ModConfig::default(),
        playtime: 0.0,
        last_played: None,
        extra: Mapping::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_yaml_record() {
        let yaml = r#"
id: 4b1f
name: Arknights Endfield
slug: arknights-endfield
installed: true
directory: /games/endfield
executable: /games/endfield/Endfield.exe
runner:
  type: proton
  path: /home/me/.steam/steam/compatibilitytools.d/GE-Proton10-14
  prefix: /home/me/Games/endfield/pfx
launch:
  env:
    DXVK_HUD: fps
  preLaunch:
    - echo start
  postLaunch: []
  args: -dx11 -windowed
mods:
  enabled: true
playtime: 12.5
lastPlayed: 2025-01-20T18:30:00Z
"#;
        let game: GameRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(game.runner.kind, RunnerKind::Proton);
        assert_eq!(game.launch.pre_launch, vec!["echo start"]);
        assert_eq!(game.launch.env.get("DXVK_HUD").map(String::as_str), Some("fps"));
        assert!(game.mods.enabled);
        assert_eq!(game.mods.importer, None);
        assert_eq!(game.playtime, 12.5);
        assert!(game.last_played.is_some());
    }

    #[test]
    fn unknown_keys_are_kept() {
        let yaml = r#"
id: g1
name: Endfield
executable: /games/endfield/Endfield.exe
year: 2025
update:
  channel: beta
mods:
  enabled: true
  fpsUnlock: 120
"#;
        let game: GameRecord = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(game.extra.get("year").and_then(|v| v.as_u64()), Some(2025));
        assert_eq!(game.mods.extra.get("fpsUnlock").and_then(|v| v.as_u64()), Some(120));
        assert!(!game.extra.contains_key("mods"));

        let written = serde_yaml::to_string(&game).unwrap();
        let reread: GameRecord = serde_yaml::from_str(&written).unwrap();
        assert_eq!(reread, game);
    }

    #[test]
    fn missing_sections_default() {
        let yaml = "id: x\nname: X\nexecutable: /bin/true\nrunner:\n  type: native\n";
        let game: GameRecord = serde_yaml::from_str(yaml).unwrap();
        assert!(game.runner.kind.is_native());
        assert!(game.launch.pre_launch.is_empty());
        assert_eq!(game.playtime, 0.0);
        assert_eq!(game.file_stem(), "x");
    }

    #[test]
    fn executable_name_handles_both_separators() {
        let mut game = sample_game("g", RunnerKind::Wine);
        assert_eq!(game.executable_name().as_deref(), Some("Endfield.exe"));

        game.executable = r"C:\Games\Star Rail\StarRail.exe".to_string();
        assert_eq!(game.executable_name().as_deref(), Some("StarRail.exe"));

        game.executable = "  ".to_string();
        assert_eq!(game.executable_name(), None);
    }

    #[test]
    fn working_dir_falls_back_to_executable_parent() {
        let mut game = sample_game("g", RunnerKind::Native);
        assert_eq!(game.working_dir(), Some(PathBuf::from("/games/endfield")));

        game.directory.clear();
        game.executable = "/opt/game/bin/run.sh".to_string();
        assert_eq!(game.working_dir(), Some(PathBuf::from("/opt/game/bin")));
    }
}
