use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;

pub static PATH_HOME: LazyLock<PathBuf> =
    LazyLock::new(|| PathBuf::from(env::var("HOME").unwrap_or_else(|_| "/".to_string())));

pub static PATH_LOCAL_SHARE: LazyLock<PathBuf> = LazyLock::new(|| PATH_HOME.join(".local/share"));

/// Base directory for all nekomimi data (`~/.config/nekomimi`)
pub static PATH_BASE: LazyLock<PathBuf> = LazyLock::new(|| {
    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg_config_home).join("nekomimi");
    }
    PATH_HOME.join(".config/nekomimi")
});

pub static PATH_CONFIG: LazyLock<PathBuf> = LazyLock::new(|| PATH_BASE.join("config.yml"));

pub static PATH_GAMES: LazyLock<PathBuf> = LazyLock::new(|| PATH_BASE.join("games"));

pub static PATH_RUNNERS: LazyLock<PathBuf> = LazyLock::new(|| PATH_BASE.join("runners"));

pub static PATH_MODS: LazyLock<PathBuf> = LazyLock::new(|| PATH_BASE.join("mods"));

pub static PATH_STEAM: LazyLock<PathBuf> = LazyLock::new(|| {
    // Check for native Steam installation first
    if PATH_LOCAL_SHARE.join("Steam").exists() {
        PATH_LOCAL_SHARE.join("Steam")
    } else if PATH_HOME.join(".steam/steam").exists() {
        // Follow the symlink at ~/.steam/steam
        PATH_HOME.join(".steam/steam")
    } else if PATH_HOME
        .join(".var/app/com.valvesoftware.Steam/.local/share/Steam")
        .exists()
    {
        // Flatpak Steam
        PATH_HOME.join(".var/app/com.valvesoftware.Steam/.local/share/Steam")
    } else {
        PATH_LOCAL_SHARE.join("Steam")
    }
});

/// Default XXMI Launcher install location
pub static PATH_LOADER: LazyLock<PathBuf> = LazyLock::new(|| PATH_MODS.join("XXMI-Launcher"));
