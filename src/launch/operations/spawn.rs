//! Detached process spawning

use std::os::unix::process::CommandExt;
use std::process::{Child, Stdio};

use crate::launch::types::LaunchCommand;

/// A process we started and can wait on
pub trait SupervisedProcess: Send {
    fn pid(&self) -> u32;
    /// Block until the process exits; `None` when killed by a signal
    fn wait(&mut self) -> std::io::Result<Option<i32>>;
}

pub trait ProcessSpawner: Send + Sync {
    /// Start `cmd` so that it outlives this process
    fn spawn_detached(&self, cmd: &LaunchCommand) -> std::io::Result<Box<dyn SupervisedProcess>>;
}

/// Spawns into a new session with null stdio, so closing the terminal or
/// exiting the launcher leaves the game running
pub struct DetachedSpawner;

struct DetachedChild(Child);

impl SupervisedProcess for DetachedChild {
    fn pid(&self) -> u32 {
        self.0.id()
    }

    fn wait(&mut self) -> std::io::Result<Option<i32>> {
        Ok(self.0.wait()?.code())
    }
}

impl ProcessSpawner for DetachedSpawner {
    fn spawn_detached(&self, cmd: &LaunchCommand) -> std::io::Result<Box<dyn SupervisedProcess>> {
        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child = command.spawn()?;
        Ok(Box::new(DetachedChild(child)))
    }
}
