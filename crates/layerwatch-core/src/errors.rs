use layerwatch_core_types::RunId;
use thiserror::Error;

/// Result type alias using LayerWatchError
pub type Result<T> = std::result::Result<T, LayerWatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers (CLI, export, tests)
/// can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    InvalidRecord,

    // Snapshot state
    /// Persisted snapshot could not be interpreted (recovered locally by stores)
    InvalidSnapshot,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Concurrency,
    ProducerFailed,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidRecord => "ERR_INVALID_RECORD",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::ProducerFailed => "ERR_PRODUCER_FAILED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, layer, path, run) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    layer_id: Option<String>,
    path: Option<String>,
    run_id: Option<RunId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            layer_id: None,
            path: None,
            run_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add layer identity context
    pub fn with_layer_id(mut self, id: impl Into<String>) -> Self {
        self.layer_id = Some(id.into());
        self
    }

    /// Add filesystem path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn layer_id(&self) -> Option<&str> {
        self.layer_id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(layer_id) = &self.layer_id {
            write!(f, " (layer_id: {})", layer_id)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(run_id) = &self.run_id {
            write!(f, " (run_id: {})", run_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for in-memory LayerWatch operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayerWatchError {
    /// A batch element or record payload is not a JSON object
    #[error("Invalid record: {reason}")]
    InvalidRecord { reason: String },

    /// A persisted snapshot document cannot be interpreted
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<LayerWatchError> for ExError {
    fn from(err: LayerWatchError) -> Self {
        match err {
            LayerWatchError::InvalidRecord { reason } => ExError::new(ExErrorKind::InvalidRecord)
                .with_message(format!("Invalid record: {}", reason)),

            LayerWatchError::InvalidSnapshot { reason } => {
                ExError::new(ExErrorKind::InvalidSnapshot)
                    .with_message(format!("Invalid snapshot: {}", reason))
            }

            LayerWatchError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            LayerWatchError::Internal { message } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for LayerWatchError {
    fn from(err: serde_json::Error) -> Self {
        LayerWatchError::Serialization {
            message: err.to_string(),
        }
    }
}
