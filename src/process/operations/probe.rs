//! Process probe backends

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::ProbeError;
use crate::process::pure::{ere_escape, name_pattern, parse_pid_list};

/// Answers whether a process whose command line mentions an executable name
/// is alive. A `ProbeError` means "don't know", never "not running".
pub trait ProcessProbe: Send + Sync {
    fn list_matching_pids(&self, executable_name: &str) -> Result<Vec<u32>, ProbeError>;

    fn probe(&self, executable_name: &str) -> Result<bool, ProbeError> {
        Ok(!self.list_matching_pids(executable_name)?.is_empty())
    }

    /// Lenient form for pre-launch checks: a failed query counts as not running
    fn is_running(&self, executable_name: &str) -> bool {
        match self.probe(executable_name) {
            Ok(running) => running,
            Err(e) => {
                debug!("Process probe for {} failed: {}", executable_name, e);
                false
            }
        }
    }
}

/// Shells out to `pgrep -f -i`
pub struct PgrepProbe;

impl ProcessProbe for PgrepProbe {
    fn list_matching_pids(&self, executable_name: &str) -> Result<Vec<u32>, ProbeError> {
        if executable_name.is_empty() {
            return Ok(Vec::new());
        }

        let output = Command::new("pgrep")
            .args(["-f", "-i"])
            .arg(ere_escape(executable_name))
            .output()?;

        // pgrep: 0 = matches, 1 = no matches, anything else = error
        match output.status.code() {
            Some(0) => Ok(parse_pid_list(
                &String::from_utf8_lossy(&output.stdout),
                std::process::id(),
            )),
            Some(1) => Ok(Vec::new()),
            _ => Err(ProbeError::Status(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }
}

/// Walks `/proc/<pid>/cmdline` directly
pub struct ProcfsProbe {
    root: PathBuf,
}

impl ProcfsProbe {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcfsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessProbe for ProcfsProbe {
    fn list_matching_pids(&self, executable_name: &str) -> Result<Vec<u32>, ProbeError> {
        let Some(pattern) = name_pattern(executable_name) else {
            return Ok(Vec::new());
        };
        let own_pid = std::process::id();

        let mut pids = Vec::new();
        for entry in fs::read_dir(&self.root)?.flatten() {
            let Some(pid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            else {
                continue;
            };
            if pid == own_pid {
                continue;
            }

            // The process may exit between read_dir and this read
            let Ok(raw) = fs::read(entry.path().join("cmdline")) else {
                continue;
            };
            let cmdline = String::from_utf8_lossy(&raw).replace('\0', " ");
            if pattern.is_match(&cmdline) {
                pids.push(pid);
            }
        }

        pids.sort_unstable();
        Ok(pids)
    }
}
