//! Error handling for layerwatch-store
//!
//! Wraps layerwatch-core ExError with store-specific helpers

use layerwatch_core::errors::{ExError, ExErrorKind, LayerWatchError};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a snapshot persistence error wrapping its cause
pub fn persist_error(path: &Path, cause: ExError) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("save_snapshot")
        .with_path(path.display().to_string())
        .with_message(format!("snapshot not persisted: {}", cause.message()))
        .with_source(cause)
}

/// Create a serialization error from a core error
pub fn serialization_error(operation: &str, err: LayerWatchError) -> ExError {
    ExError::from(err).with_op(operation.to_string())
}
