//! `hepflat prune`: remove particles from HepMC2 files by PDG id.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use hepflat_core::{HepMcReader, HepMcWriter, PruneFilter, ReadError};
use tracing::{info, warn};

/// Progress heartbeat interval, in events.
const PROGRESS_EVERY: u64 = 1000;

#[derive(Args, Debug)]
pub struct PruneArgs {
    /// Input files to prune, in order.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file.
    #[arg(short, long, default_value = "pruned.hepmc")]
    pub output: PathBuf,

    /// PDG id to delete from the event record (matched on |id|,
    /// repeatable).
    #[arg(short = 'd', long = "delete", value_name = "ID")]
    pub remove_ids: Vec<i32>,

    /// PDG id to keep in the event record (matched on |id|, repeatable,
    /// takes precedence over --delete; a non-empty keep list removes
    /// everything not on it).
    #[arg(short = 'k', long = "keep", value_name = "ID")]
    pub keep_ids: Vec<i32>,
}

pub fn run_prune(args: &PruneArgs) -> Result<()> {
    let filter = PruneFilter::new(args.keep_ids.iter().copied(), args.remove_ids.iter().copied());

    let out = File::create(&args.output)
        .with_context(|| format!("failed to create output {}", args.output.display()))?;
    let mut writer = HepMcWriter::new(BufWriter::new(out));

    info!(
        inputs = args.inputs.len(),
        keep = ?args.keep_ids,
        remove = ?args.remove_ids,
        output = %args.output.display(),
        "pruning"
    );

    let mut skipped: u64 = 0;
    let mut particles_removed: usize = 0;
    for input in &args.inputs {
        let file = File::open(input)
            .with_context(|| format!("failed to open input {}", input.display()))?;
        info!(input = %input.display(), "reading");

        for event in HepMcReader::new(BufReader::new(file)) {
            match event {
                Ok(mut event) => {
                    let stats = filter.prune_event(&mut event);
                    particles_removed += stats.particles_removed;
                    writer
                        .write_event(&event)
                        .context("failed to write pruned event")?;
                    if writer.events_written() % PROGRESS_EVERY == 0 {
                        info!(total = writer.events_written(), "progress");
                    }
                }
                Err(err @ ReadError::Malformed { .. }) => {
                    warn!(%err, input = %input.display(), "skipping malformed event record");
                    skipped += 1;
                }
                // An I/O failure repeats on every subsequent call; skipping
                // would loop forever.
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("failed to read {}", input.display()));
                }
            }
        }
    }

    let total = writer.events_written();
    writer.finish().context("failed to flush pruned output")?;

    info!(total, skipped, particles_removed, "prune complete");
    println!(
        "{total} events processed, {particles_removed} particles removed, \
         {skipped} skipped -> {}",
        args.output.display()
    );
    Ok(())
}
