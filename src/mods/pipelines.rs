//! Pipelines module (orchestration)

pub mod bridge;

pub use bridge::{LoaderDeps, LoaderLauncher, ModLoaderBridge};
