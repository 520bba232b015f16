//! Pipelines module (orchestration)

pub mod sequencer;
pub mod session;

pub use sequencer::{Collaborators, Launcher};
pub use session::{SessionCommitter, SessionEnd};
