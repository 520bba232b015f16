//! Pure module (no I/O)

pub mod loader_command;
pub mod loader_config;
pub mod profiles;

pub use loader_command::{build_loader_command, loader_exe_path, LOADER_EXE};
pub use loader_config::{apply_game_settings, LOADER_CONFIG_FILE};
pub use profiles::{pick_profile, BuiltinProfiles, ProfileResolver};
