//! Detect command

use clap::Args;
use layerwatch_core::change::{render_human_summary, serialize_changes};
use layerwatch_core::errors::{ExError, ExErrorKind};
use layerwatch_core::record::Record;
use layerwatch_engine::{gather_batch, DetectionService, LayerProducer};
use layerwatch_store::errors::io_error;
use layerwatch_store::{FsSnapshotStore, StoreConfig};
use std::io::Read;
use std::path::{Path, PathBuf};

const STDIN_ARG: &str = "-";

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Batch file holding a JSON array of layer records, or "-" for stdin.
    /// Repeat to combine several files into one batch.
    #[arg(long, short, required = true)]
    pub input: Vec<String>,

    /// Print the change list as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    /// Also write the change list as JSON to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Reads one batch file (or stdin) as a producer.
struct BatchFileProducer {
    name: String,
    path: Option<PathBuf>,
}

impl BatchFileProducer {
    fn from_arg(arg: &str) -> Self {
        if arg == STDIN_ARG {
            Self {
                name: "stdin".to_string(),
                path: None,
            }
        } else {
            Self {
                name: arg.to_string(),
                path: Some(PathBuf::from(arg)),
            }
        }
    }

    fn read_bytes(&self) -> Result<Vec<u8>, ExError> {
        match &self.path {
            Some(path) => std::fs::read(path).map_err(|e| io_error("read_batch", path, e)),
            None => {
                let mut bytes = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut bytes)
                    .map_err(|e| io_error("read_batch", Path::new(STDIN_ARG), e))?;
                Ok(bytes)
            }
        }
    }
}

impl LayerProducer for BatchFileProducer {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<Record>, ExError> {
        let bytes = self.read_bytes()?;
        Record::batch_from_json_slice(&bytes).map_err(|e| {
            ExError::new(ExErrorKind::InvalidInput)
                .with_op("read_batch")
                .with_path(self.name.clone())
                .with_message(e.to_string())
        })
    }
}

pub fn execute(args: DetectArgs, config: &StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    check_inputs(&args.input)?;
    if let Some(output) = &args.output {
        check_output(output)?;
    }

    let producers: Vec<BatchFileProducer> = args
        .input
        .iter()
        .map(|arg| BatchFileProducer::from_arg(arg))
        .collect();
    let producer_refs: Vec<&dyn LayerProducer> = producers
        .iter()
        .map(|p| p as &dyn LayerProducer)
        .collect();

    // A partial batch would drop the missing file's layers from the baseline.
    let gathered = gather_batch(&producer_refs);
    if let Some(failure) = gathered.failures.into_iter().next() {
        let cause = failure
            .error
            .source_error()
            .cloned()
            .unwrap_or(failure.error);
        return Err(Box::new(cause));
    }

    let service = DetectionService::new(FsSnapshotStore::from_config(config));
    let report = service.run(&gathered.records)?;

    // The cache now holds the new baseline: the change list must reach stdout
    // before anything else can fail.
    let serialized = serde_json::to_string_pretty(&serialize_changes(&report.changes))?;
    if args.json {
        println!("{}", serialized);
    } else {
        print!("{}", render_human_summary(&report.changes));
    }

    if !report.dropped_keys.is_empty() {
        let note = format!(
            "{} cached layer(s) absent from this batch were dropped from the baseline.",
            report.dropped_keys.len()
        );
        if args.json {
            eprintln!("{}", note);
        } else {
            println!("\n{}", note);
        }
    }

    if let Some(output) = &args.output {
        std::fs::write(output, format!("{}\n", serialized)).map_err(|e| {
            let cause = io_error("write_output", output, e);
            ExError::new(ExErrorKind::Io)
                .with_op("write_output")
                .with_path(output.display().to_string())
                .with_message(format!(
                    "cache updated and {} change(s) printed to stdout, but the output file was not written: {}",
                    report.changes.len(),
                    cause.message()
                ))
                .with_source(cause)
        })?;
    }

    Ok(())
}

/// Stdin can feed only one producer.
fn check_inputs(inputs: &[String]) -> Result<(), ExError> {
    if inputs.iter().filter(|arg| arg.as_str() == STDIN_ARG).count() > 1 {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("read_batch")
            .with_message("stdin (\"-\") may be given to --input only once"));
    }
    Ok(())
}

/// Reject an output path that can never be written before the cache moves.
fn check_output(output: &Path) -> Result<(), ExError> {
    if output.is_dir() {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("write_output")
            .with_path(output.display().to_string())
            .with_message("--output is a directory"));
    }
    Ok(())
}
