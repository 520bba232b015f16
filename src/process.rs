//! Process probing - "is this game running?" answered from the OS process list
//!
//! Matching is by executable name against full command lines rather than by
//! pid, because Wine and Proton re-exec through helper processes we never
//! spawn ourselves.
//!
//! ## Module Structure
//! - `pure/`: Command-line matching and pgrep output parsing
//! - `operations/`: Probe backends (pgrep, /proc) and stale-process killing

mod operations;
mod pure;

pub use operations::{PgrepProbe, PkillKiller, ProcessProbe, ProcfsProbe, StaleProcessKiller};

use std::sync::Arc;

use crate::config::ProbeBackend;

/// Build the probe selected in the app config
pub fn probe_for(backend: ProbeBackend) -> Arc<dyn ProcessProbe> {
    match backend {
        ProbeBackend::Pgrep => Arc::new(PgrepProbe),
        ProbeBackend::Procfs => Arc::new(ProcfsProbe::new()),
    }
}
