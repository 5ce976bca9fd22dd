//! LayerWatch Engine - Orchestration layer
//!
//! Coordinates producers, the change detector and the snapshot store:
//! - `producer`: the producer boundary and batch assembly across producers
//! - `commands::detect`: detection serialized per store

pub mod commands;
pub mod producer;

pub use commands::detect::{DetectionService, GatheredDetection};
pub use producer::{gather_batch, GatherOutcome, LayerProducer, ProducerFailure};
