//! `hepflat merge`: concatenate several HepMC2 event streams into one.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use hepflat_core::{HepMcReader, HepMcWriter, ReadError};
use tracing::{info, warn};

/// Progress heartbeat interval, in events.
const PROGRESS_EVERY: u64 = 1000;

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Input files to merge, in order.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file.
    #[arg(short, long, default_value = "merged.hepmc")]
    pub output: PathBuf,
}

pub fn run_merge(args: &MergeArgs) -> Result<()> {
    let out = File::create(&args.output)
        .with_context(|| format!("failed to create output {}", args.output.display()))?;
    let mut writer = HepMcWriter::new(BufWriter::new(out));

    info!(inputs = args.inputs.len(), output = %args.output.display(), "merging");

    let mut skipped: u64 = 0;
    for input in &args.inputs {
        let file = File::open(input)
            .with_context(|| format!("failed to open input {}", input.display()))?;
        info!(input = %input.display(), "reading");

        let mut file_events: u64 = 0;
        for event in HepMcReader::new(BufReader::new(file)) {
            match event {
                Ok(event) => {
                    writer
                        .write_event(&event)
                        .context("failed to write merged event")?;
                    file_events += 1;
                    if writer.events_written() % PROGRESS_EVERY == 0 {
                        info!(
                            total = writer.events_written(),
                            file_events,
                            "progress"
                        );
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
    writer.finish().context("failed to flush merged output")?;

    info!(total, skipped, "merge complete");
    println!(
        "{total} events merged, {skipped} skipped -> {}",
        args.output.display()
    );
    Ok(())
}
