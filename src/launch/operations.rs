//! Operations module (atomic side effects)

pub mod hooks;
pub mod spawn;

pub use hooks::{run_post_launch, run_pre_launch, ShellRunner, SystemShell};
pub use spawn::{DetachedSpawner, ProcessSpawner, SupervisedProcess};
