//! Snapshot state: the last-observed record for every identity.
//!
//! ## Responsibilities
//!
//! - Define the snapshot document model (`Snapshot`)
//! - Define the storage seam (`SnapshotStore`) and an in-memory store
//! - Compute a deterministic digest of snapshot contents
//!
//! ## Non-Responsibilities
//!
//! - File persistence (handled by `layerwatch-store`)
//! - Orchestration (handled by `detector` and `layerwatch-engine`)

pub mod digest;
pub mod model;
pub mod store;

pub use digest::compute_snapshot_digest;
pub use model::Snapshot;
pub use store::{InMemorySnapshotStore, SnapshotStore};
