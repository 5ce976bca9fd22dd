//! File-backed snapshot storage
//!
//! Provides:
//! - Atomic writes via a sibling temp file and rename
//! - Lenient loading: missing or corrupt documents load as empty

mod atomic;
mod fs_store;

pub use fs_store::{FsSnapshotStore, LoadOutcome};
