//! Launch module - game launching and session tracking
//!
//! This module provides:
//! - Command resolution for native, Wine and Proton games
//! - Pre/post-launch hook execution
//! - Detached process spawning
//! - The launch sequencer and session playtime commits
//!
//! ## Module Structure
//! - `types.rs`: Launch command, outcome and phase types
//! - `pure/`: Pure functions (command building, validation, mode selection)
//! - `operations/`: Atomic side effects (hooks, spawning)
//! - `pipelines/`: High-level orchestration (sequencer, session commit)

mod operations;
mod pipelines;
mod pure;
mod types;

// Re-export public API
pub use operations::{DetachedSpawner, ProcessSpawner, ShellRunner, SupervisedProcess, SystemShell};
pub use pipelines::{Collaborators, Launcher, SessionCommitter, SessionEnd};
pub use pure::{
    compose_dll_overrides, format_launch_cmd, ENV_DLL_OVERRIDES, ENV_WINEPREFIX, LOADER_DLL_OVERRIDE,
};
pub use types::{LaunchCommand, LaunchOutcome, LaunchPhase};
