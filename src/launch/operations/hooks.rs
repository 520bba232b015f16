//! Pre/post-launch shell hooks

use std::process::Command;

use tracing::{info, warn};

use crate::error::LaunchError;

/// Runs one shell command line to completion and reports its exit code
pub trait ShellRunner: Send + Sync {
    /// `Ok(None)` means the command was killed by a signal
    fn run(&self, command: &str) -> std::io::Result<Option<i32>>;
}

/// `sh -c`, inheriting our stdin/stdout/stderr
pub struct SystemShell;

impl ShellRunner for SystemShell {
    fn run(&self, command: &str) -> std::io::Result<Option<i32>> {
        let status = Command::new("sh").arg("-c").arg(command).status()?;
        Ok(status.code())
    }
}

/// Run pre-launch commands in order, stopping at the first failure
pub fn run_pre_launch(shell: &dyn ShellRunner, commands: &[String]) -> Result<(), LaunchError> {
    for command in commands {
        info!("Running pre-launch: {}", command);
        match shell.run(command) {
            Ok(Some(0)) => {}
            Ok(code) => {
                return Err(LaunchError::PreLaunchFailed {
                    command: command.clone(),
                    code,
                });
            }
            Err(e) => {
                warn!("Could not run pre-launch command {}: {}", command, e);
                return Err(LaunchError::PreLaunchFailed {
                    command: command.clone(),
                    code: None,
                });
            }
        }
    }
    Ok(())
}

/// Run post-launch commands in order. Failures are logged and skipped.
pub fn run_post_launch(shell: &dyn ShellRunner, commands: &[String]) {
    for command in commands {
        info!("Running post-launch: {}", command);
        match shell.run(command) {
            Ok(Some(0)) => {}
            Ok(Some(code)) => warn!("Post-launch command {} exited with {}", command, code),
            Ok(None) => warn!("Post-launch command {} was terminated by a signal", command),
            Err(e) => warn!("Could not run post-launch command {}: {}", command, e),
        }
    }
}
