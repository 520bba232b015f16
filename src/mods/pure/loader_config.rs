// Edits to the loader's own JSON config (no I/O)

use serde_json::{Map, Value};

pub const LOADER_CONFIG_FILE: &str = "XXMI Launcher Config.json";

/// Start the game through a shell so Wine resolves the executable path
pub const PROCESS_START_METHOD: &str = "Shell";
pub const INJECT_MODE: &str = "Inject";

/// Point the loader at `game_folder` for `importer` and select the Wine-friendly
/// start and injection settings.
///
/// Only the named keys are touched; everything else, including key order,
/// is kept. Returns true if anything changed.
pub fn apply_game_settings(config: &mut Value, importer: &str, game_folder: &str) -> bool {
    let mut changed = false;
    if !config.is_object() {
        *config = Value::Object(Map::new());
        changed = true;
    }
    apply_to_root(config, importer, game_folder, &mut changed);
    changed
}

fn apply_to_root(config: &mut Value, importer: &str, game_folder: &str, changed: &mut bool) -> Option<()> {
    let root = config.as_object_mut()?;

    let launcher = child_object(root, "Launcher", changed)?;
    *changed |= set_string(launcher, "active_importer", importer);

    let importers = child_object(root, "Importers", changed)?;
    let entry = child_object(importers, importer, changed)?;
    let settings = child_object(entry, "Importer", changed)?;
    *changed |= set_string(settings, "game_folder", game_folder);
    *changed |= set_string(settings, "process_start_method", PROCESS_START_METHOD);
    *changed |= set_string(settings, "custom_launch_inject_mode", INJECT_MODE);

    Some(())
}

/// `map[key]` as an object; a missing or non-object value is replaced
fn child_object<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    changed: &mut bool,
) -> Option<&'a mut Map<String, Value>> {
    let slot = map.entry(key).or_insert(Value::Null);
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
        *changed = true;
    }
    slot.as_object_mut()
}

fn set_string(map: &mut Map<String, Value>, key: &str, value: &str) -> bool {
    if map.get(key).and_then(Value::as_str) == Some(value) {
        return false;
    }
    map.insert(key.to_string(), Value::String(value.to_string()));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_config() -> Value {
        json!({
            "Launcher": {
                "active_importer": "GIMI",
                "theme": "dark"
            },
            "Importers": {
                "GIMI": { "Importer": { "game_folder": "/games/genshin" } },
                "EFMI": {
                    "Importer": {
                        "game_folder": "",
                        "process_start_method": "Native",
                        "extra_libraries": ["a.dll"]
                    },
                    "Migoto": { "enforce_rendering": true }
                }
            },
            "Telemetry": false
        })
    }

    #[test]
    fn sets_importer_keys_and_keeps_others() {
        let mut config = sample_config();
        assert!(apply_game_settings(&mut config, "EFMI", "/games/endfield"));

        assert_eq!(config["Launcher"]["active_importer"], "EFMI");
        assert_eq!(config["Launcher"]["theme"], "dark");
        let importer = &config["Importers"]["EFMI"]["Importer"];
        assert_eq!(importer["game_folder"], "/games/endfield");
        assert_eq!(importer["process_start_method"], "Shell");
        assert_eq!(importer["custom_launch_inject_mode"], "Inject");
        assert_eq!(importer["extra_libraries"], json!(["a.dll"]));
        assert_eq!(config["Importers"]["EFMI"]["Migoto"]["enforce_rendering"], true);
        assert_eq!(config["Importers"]["GIMI"]["Importer"]["game_folder"], "/games/genshin");
        assert_eq!(config["Telemetry"], false);
    }

    #[test]
    fn second_application_is_a_no_op() {
        let mut once = sample_config();
        apply_game_settings(&mut once, "EFMI", "/games/endfield");
        let mut twice = once.clone();

        assert!(!apply_game_settings(&mut twice, "EFMI", "/games/endfield"));
        assert_eq!(
            serde_json::to_string_pretty(&once).unwrap(),
            serde_json::to_string_pretty(&twice).unwrap()
        );
    }

    #[test]
    fn key_order_is_preserved() {
        let mut config = sample_config();
        apply_game_settings(&mut config, "EFMI", "/games/endfield");
        let keys: Vec<&String> = config.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Launcher", "Importers", "Telemetry"]);
    }

    #[test]
    fn builds_missing_sections() {
        let mut config = json!({});
        assert!(apply_game_settings(&mut config, "ZZMI", "/games/zzz"));
        assert_eq!(config["Importers"]["ZZMI"]["Importer"]["game_folder"], "/games/zzz");
        assert_eq!(config["Launcher"]["active_importer"], "ZZMI");
    }

    #[test]
    fn non_object_root_is_replaced() {
        let mut config = json!([1, 2, 3]);
        assert!(apply_game_settings(&mut config, "EFMI", "/g"));
        assert!(config.is_object());
    }
}
