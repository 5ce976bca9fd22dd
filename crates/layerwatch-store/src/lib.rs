//! LayerWatch Store - durable snapshot persistence
//!
//! Provides:
//! - A file-backed `SnapshotStore` holding one JSON document
//! - Atomic temp→rename writes so readers never see a half-written cache
//! - Store configuration with the conventional cache file name

pub mod config;
pub mod errors;
pub mod file;

// Re-export key types
pub use config::StoreConfig;
pub use errors::Result;
pub use file::{FsSnapshotStore, LoadOutcome};
