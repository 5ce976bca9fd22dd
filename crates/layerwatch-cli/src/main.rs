//! LayerWatch CLI
//!
//! Command-line interface for layer change detection

use clap::{Parser, Subcommand, ValueEnum};
use layerwatch_core::logging_facility::{init, Profile};
use layerwatch_store::config::DEFAULT_CACHE_FILE;
use layerwatch_store::StoreConfig;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "layerwatch")]
#[command(about = "LayerWatch - Change detection for geospatial layer catalogs", long_about = None)]
struct Cli {
    /// Snapshot cache file
    #[arg(long, global = true, env = "LAYERWATCH_CACHE", default_value = DEFAULT_CACHE_FILE)]
    cache: PathBuf,

    /// Log output format (logs go to stderr)
    #[arg(
        long,
        global = true,
        env = "LAYERWATCH_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Pretty
    )]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn profile(self) -> Profile {
        match self {
            LogFormat::Pretty => Profile::Development,
            LogFormat::Json => Profile::Production,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare a batch of layer records against the cache
    Detect(commands::detect::DetectArgs),
    /// Inspect the cached snapshot
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn main() {
    let cli = Cli::parse();
    init(cli.log_format.profile());

    let config = StoreConfig::with_path(cli.cache);
    let result = match cli.command {
        Commands::Detect(args) => commands::detect::execute(args, &config),
        Commands::Snapshot(args) => commands::snapshot::execute(args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
