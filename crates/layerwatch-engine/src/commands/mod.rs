//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! producers, core detection logic and the persistence layer.

pub mod detect;
