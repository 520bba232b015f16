// Stale process cleanup

use std::process::Command;

use tracing::{debug, info};

use crate::process::pure::ere_escape;

/// Force-kills leftovers from an earlier failed launch. Best-effort: any
/// failure means the process is treated as already gone.
pub trait StaleProcessKiller: Send + Sync {
    fn kill_matching(&self, executable_name: &str);
}

/// `pkill -9 -f -i`
pub struct PkillKiller;

impl StaleProcessKiller for PkillKiller {
    fn kill_matching(&self, executable_name: &str) {
        if executable_name.is_empty() {
            return;
        }

        match Command::new("pkill")
            .args(["-9", "-f", "-i"])
            .arg(ere_escape(executable_name))
            .status()
        {
            Ok(status) if status.success() => {
                info!("Killed stale {} process(es)", executable_name);
                // Give processes time to terminate
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            Ok(_) => debug!("No stale {} processes", executable_name),
            Err(e) => debug!("pkill for {} failed: {}", executable_name, e),
        }
    }
}
