// Loader command building (no I/O)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::launch::{
    compose_dll_overrides, LaunchCommand, ENV_DLL_OVERRIDES, ENV_WINEPREFIX, LOADER_DLL_OVERRIDE,
};
use crate::mods::types::LoaderProfile;

pub const LOADER_EXE: &str = "XXMI Launcher.exe";

/// The loader also needs the game folder's dxgi, behind the graphics hook's d3d11
pub const LOADER_DXGI_OVERRIDE: &str = "dxgi=n,b";

/// `<loader>/Resources/Bin`, where the loader executable lives
pub fn loader_bin_dir(loader_root: &Path) -> PathBuf {
    loader_root.join("Resources").join("Bin")
}

pub fn loader_exe_path(loader_root: &Path) -> PathBuf {
    loader_bin_dir(loader_root).join(LOADER_EXE)
}

/// `wine64 "XXMI Launcher.exe" --nogui --xxmi <ID>` with an X11-only,
/// native-DLL environment. The loader itself starts the game.
pub fn build_loader_command(
    wine64: &Path,
    loader_root: &Path,
    prefix: &str,
    profile: &LoaderProfile,
) -> LaunchCommand {
    let mut env = BTreeMap::new();
    env.insert(ENV_WINEPREFIX.to_string(), prefix.to_string());
    env.insert("WINEARCH".to_string(), "win64".to_string());
    // The loader's Qt UI misbehaves under Wayland
    env.insert("DISABLE_WAYLAND".to_string(), "1".to_string());
    env.insert("GDK_BACKEND".to_string(), "x11".to_string());
    env.insert("QT_QPA_PLATFORM".to_string(), "xcb".to_string());
    env.insert("DXVK_STATE_CACHE_PATH".to_string(), prefix.to_string());
    env.insert(
        ENV_DLL_OVERRIDES.to_string(),
        compose_dll_overrides(LOADER_DLL_OVERRIDE, Some(LOADER_DXGI_OVERRIDE)),
    );

    LaunchCommand {
        program: wine64.to_string_lossy().into_owned(),
        args: vec![
            loader_exe_path(loader_root).to_string_lossy().into_owned(),
            "--nogui".to_string(),
            "--xxmi".to_string(),
            profile.id().to_string(),
        ],
        env,
        cwd: Some(loader_bin_dir(loader_root)),
    }
}
