//! Pure module (no I/O)

pub mod matching;

pub use matching::{ere_escape, name_pattern, parse_pid_list};
