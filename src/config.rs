//! App configuration (`config.yml`)
//!
//! ## Module Structure
//! - `types.rs`: Config sections and their defaults
//! - `operations/`: Loading and saving with graceful fallback

mod operations;
mod types;

pub use operations::{load_cfg, load_cfg_from, save_cfg};
pub use types::{AppConfig, LoaderSettings, ProbeBackend, RunnerPrefs, TrackingConfig};
