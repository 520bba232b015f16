use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which process-list backend answers "is it running?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProbeBackend {
    #[default]
    Pgrep,
    Procfs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RunnerPrefs {
    /// Extra directories searched for compatibility runtimes
    #[serde(default)]
    pub scan_paths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval_secs: u64,
    /// A tracked run younger than this blocks a relaunch without probing
    #[serde(default = "default_launch_grace")]
    pub launch_grace_secs: u64,
    #[serde(default)]
    pub probe: ProbeBackend,
}

fn default_reconcile_interval() -> u64 {
    5
}

fn default_launch_grace() -> u64 {
    10
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            reconcile_interval_secs: default_reconcile_interval(),
            launch_grace_secs: default_launch_grace(),
            probe: ProbeBackend::default(),
        }
    }
}

impl TrackingConfig {
    pub fn reconcile_interval(&self) -> Duration {
        // A zero interval would spin the reconciler
        Duration::from_secs(self.reconcile_interval_secs.max(1))
    }

    pub fn launch_grace(&self) -> Duration {
        Duration::from_secs(self.launch_grace_secs)
    }
}

/// Mod loader (XXMI Launcher) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderSettings {
    /// Loader install directory; empty = `<base>/mods/XXMI-Launcher`
    #[serde(default)]
    pub path: String,
    /// Prefix the loader runs in; empty = the game's own prefix
    #[serde(default)]
    pub prefix: String,
    /// Proton runtime used for the loader; empty = the game's runner or autodetect
    #[serde(default)]
    pub runner: String,
    /// How long to wait after starting the loader before returning
    #[serde(default = "default_startup_grace")]
    pub startup_grace_secs: u64,
    /// Extra executable name -> importer id mappings
    #[serde(default)]
    pub profiles: BTreeMap<String, String>,
}

fn default_startup_grace() -> u64 {
    3
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            path: String::new(),
            prefix: String::new(),
            runner: String::new(),
            startup_grace_secs: default_startup_grace(),
            profiles: BTreeMap::new(),
        }
    }
}

impl LoaderSettings {
    pub fn startup_grace(&self) -> Duration {
        Duration::from_secs(self.startup_grace_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub runner: RunnerPrefs,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub loader: LoaderSettings,
}
