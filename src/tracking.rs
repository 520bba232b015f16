//! Run tracking - which games are running right now
//!
//! The registry is the only shared mutable state of the launcher. The
//! reconciler thread re-probes every tracked run and evicts the ones whose
//! executable has disappeared, independent of any exit notification.
//!
//! ## Module Structure
//! - `types.rs`: Tracked run and registry slot types
//! - `registry.rs`: Lock-guarded run registry
//! - `reconcile.rs`: Background reconciliation loop

mod reconcile;
mod registry;
mod types;

pub use reconcile::Reconciler;
pub use registry::{Admission, Eviction, RunRegistry};
pub use types::{RunId, RunningGame, TrackedRun};
