//! Producer boundary and batch assembly.
//!
//! A producer is anything that yields a batch of layer records: a catalog
//! crawler, a fixture, a file reader. [`gather_batch`] runs several of them
//! in parallel and assembles a single batch for one detection pass.

use layerwatch_core::errors::{ExError, ExErrorKind};
use layerwatch_core::record::Record;
use layerwatch_core::{log_op_end, log_op_start};
use std::any::Any;
use std::thread;
use std::time::Instant;

/// A source of layer records.
pub trait LayerProducer: Send + Sync {
    /// Stable name used in logs and failure reports
    fn name(&self) -> &str;

    /// Fetch the current records.
    ///
    /// # Errors
    ///
    /// Any error means this producer contributes nothing to the batch.
    fn fetch(&self) -> Result<Vec<Record>, ExError>;
}

/// A producer that did not contribute to the batch.
#[derive(Debug, Clone)]
pub struct ProducerFailure {
    pub producer: String,
    pub error: ExError,
}

/// Assembled batch plus the producers that failed.
#[derive(Debug, Clone, Default)]
pub struct GatherOutcome {
    /// Records of every successful producer, in registration order
    pub records: Vec<Record>,
    pub failures: Vec<ProducerFailure>,
}

impl GatherOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every producer on its own scoped thread and concatenate the results.
///
/// Records are appended in producer registration order, not completion
/// order, so the batch (and therefore the change list) is deterministic. A
/// producer that returns an error or panics is reported in
/// [`GatherOutcome::failures`] and does not affect the others.
pub fn gather_batch(producers: &[&dyn LayerProducer]) -> GatherOutcome {
    let started = Instant::now();
    log_op_start!("gather_batch", producers = producers.len());

    let results: Vec<(String, Result<Vec<Record>, ExError>)> = thread::scope(|scope| {
        let handles: Vec<_> = producers
            .iter()
            .map(|producer| {
                let producer: &dyn LayerProducer = *producer;
                (producer.name().to_string(), scope.spawn(move || producer.fetch()))
            })
            .collect();

        handles
            .into_iter()
            .map(|(name, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|payload| Err(panic_error(&name, payload.as_ref())));
                (name, result)
            })
            .collect()
    });

    let mut outcome = GatherOutcome::default();
    for (name, result) in results {
        match result {
            Ok(records) => {
                tracing::debug!(producer = %name, batch_len = records.len(), "producer finished");
                outcome.records.extend(records);
            }
            Err(cause) => {
                let error = ExError::new(ExErrorKind::ProducerFailed)
                    .with_op("gather_batch")
                    .with_message(format!("producer '{}' failed: {}", name, cause))
                    .with_source(cause);
                tracing::warn!(
                    producer = %name,
                    err_code = error.code(),
                    "producer contributed no records"
                );
                outcome.failures.push(ProducerFailure {
                    producer: name,
                    error,
                });
            }
        }
    }

    log_op_end!(
        "gather_batch",
        duration_ms = started.elapsed().as_millis() as u64,
        batch_len = outcome.records.len(),
        failures = outcome.failures.len()
    );
    outcome
}

fn panic_error(producer: &str, payload: &(dyn Any + Send)) -> ExError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    ExError::new(ExErrorKind::Internal)
        .with_op("fetch")
        .with_message(format!("producer '{}' panicked: {}", producer, detail))
}
