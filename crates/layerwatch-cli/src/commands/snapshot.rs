//! Snapshot inspection commands

use clap::{Args, Subcommand};
use layerwatch_store::{FsSnapshotStore, LoadOutcome, StoreConfig};
use std::io::Write;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    #[command(subcommand)]
    pub command: SnapshotCommand,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Print the cached records
    Show(ShowArgs),
    /// Print the entry count and SHA-256 digest of the cached snapshot
    Digest,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Print identity keys only, one per line
    #[arg(long)]
    pub keys_only: bool,
}

pub fn execute(args: SnapshotArgs, config: &StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = FsSnapshotStore::from_config(config);
    match args.command {
        SnapshotCommand::Show(show_args) => execute_show(&store, show_args),
        SnapshotCommand::Digest => execute_digest(&store),
    }
}

fn execute_show(store: &FsSnapshotStore, args: ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = match store.load_outcome() {
        LoadOutcome::Loaded(snapshot) => snapshot,
        LoadOutcome::Missing => {
            println!("No snapshot at {}", store.path().display());
            return Ok(());
        }
        LoadOutcome::Corrupt { reason } => {
            println!(
                "Snapshot at {} is unreadable and will be treated as empty: {}",
                store.path().display(),
                reason
            );
            return Ok(());
        }
    };

    if args.keys_only {
        for key in snapshot.keys() {
            println!("{}", key);
        }
        return Ok(());
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&snapshot.to_json_vec(true)?)?;
    writeln!(stdout)?;
    Ok(())
}

fn execute_digest(store: &FsSnapshotStore) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = store.load_outcome();
    if let LoadOutcome::Corrupt { reason } = &outcome {
        eprintln!("warning: snapshot unreadable, digesting as empty: {}", reason);
    }
    let snapshot = outcome.into_snapshot();

    println!("entries: {}", snapshot.len());
    println!("digest: {}", snapshot.digest()?);
    Ok(())
}
