//! Game library records
//!
//! ## Module Structure
//! - `types.rs`: the persisted game record (per-game YAML schema)
//! - `store.rs`: `GameStore` trait and the YAML directory implementation

mod store;
mod types;

pub use store::{GameStore, YamlGameStore};
pub use types::{GameRecord, LaunchConfig, ModConfig, RunnerConfig, RunnerKind};

#[cfg(test)]
pub(crate) use types::sample_game;
