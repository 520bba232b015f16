//! Operations module (atomic side effects)

pub mod io;

pub use io::{load_cfg, load_cfg_from, save_cfg};
