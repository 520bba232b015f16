//! Pure module (no I/O)

pub mod command;
pub mod mode;
pub mod validation;

pub use command::{
    compose_dll_overrides, format_launch_cmd, resolve, ENV_DLL_OVERRIDES, ENV_WINEPREFIX,
    LOADER_DLL_OVERRIDE,
};
pub use mode::{select_mode, LaunchMode};
pub use validation::validate_game;
