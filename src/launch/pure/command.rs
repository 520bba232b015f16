// Pure command building functions (no I/O)

use std::collections::BTreeMap;
use std::path::Path;

use crate::game::{GameRecord, RunnerKind};
use crate::launch::types::LaunchCommand;

pub const BIN_WINE: &str = "wine";
/// Proton outside of Steam goes through umu-run, which reads PROTONPATH
pub const BIN_UMU_RUN: &str = "umu-run";

pub const ENV_WINEPREFIX: &str = "WINEPREFIX";
pub const ENV_PROTONPATH: &str = "PROTONPATH";
pub const ENV_DLL_OVERRIDES: &str = "WINEDLLOVERRIDES";

/// Load the graphics hook's d3d11.dll from the game folder instead of Wine's builtin
pub const LOADER_DLL_OVERRIDE: &str = "d3d11=n,b";

/// Split the free-form argument string into tokens
pub fn tokenize_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

/// Prepend `directive` to an existing WINEDLLOVERRIDES value
pub fn compose_dll_overrides(directive: &str, existing: Option<&str>) -> String {
    match existing.map(str::trim).filter(|e| !e.is_empty()) {
        Some(existing) => format!("{};{}", directive, existing),
        None => directive.to_string(),
    }
}

/// Build the command line and environment overlay for a game.
///
/// `launch.env` is applied over the runner defaults and wins on collision.
/// With `use_loader_overrides` the DLL override for the graphics hook is
/// prepended to whatever override the merged environment already carries.
/// That is for running a game with the hook DLL already in its folder; the
/// loader bridge builds its own command with `build_loader_command`, so
/// the launch sequencer always passes `false`.
pub fn resolve(game: &GameRecord, use_loader_overrides: bool) -> LaunchCommand {
    let executable = game.executable.trim().to_string();
    let mut env: BTreeMap<String, String> = BTreeMap::new();

    let (program, mut args) = match game.runner.kind {
        RunnerKind::Native => (executable, Vec::new()),
        RunnerKind::Wine => (BIN_WINE.to_string(), vec![executable]),
        RunnerKind::Proton => {
            env.insert(ENV_PROTONPATH.to_string(), game.runner.path.clone());
            (BIN_UMU_RUN.to_string(), vec![executable])
        }
    };

    if !game.runner.kind.is_native() {
        env.insert(ENV_WINEPREFIX.to_string(), game.runner.prefix.clone());
    }

    for (key, value) in &game.launch.env {
        env.insert(key.clone(), value.clone());
    }

    if use_loader_overrides {
        let composed = compose_dll_overrides(
            LOADER_DLL_OVERRIDE,
            env.get(ENV_DLL_OVERRIDES).map(String::as_str),
        );
        env.insert(ENV_DLL_OVERRIDES.to_string(), composed);
    }

    args.extend(tokenize_args(&game.launch.args));

    LaunchCommand {
        program,
        args,
        env,
        cwd: game.working_dir(),
    }
}

/// Format a launch command for debug logging (pure string building).
///
/// Returns the formatted string. Caller is responsible for printing.
pub fn format_launch_cmd(cmd: &LaunchCommand, title: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}:\n", title));

    let cwd = cmd.cwd.as_deref().unwrap_or_else(|| Path::new(""));
    output.push_str(&format!("  CWD={}\n", cwd.display()));

    for (key, value) in &cmd.env {
        output.push_str(&format!("  {}={}\n", key, value));
    }

    output.push_str(&format!("  \"{}\"", cmd.program));
    for arg in &cmd.args {
        output.push_str(&format!(" \"{}\"", arg));
    }

    output
}
