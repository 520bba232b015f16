//! Operations module (atomic side effects)

pub mod kill;
pub mod probe;

pub use kill::{PkillKiller, StaleProcessKiller};
pub use probe::{PgrepProbe, ProcessProbe, ProcfsProbe};
