//! `hepflat convert`: HepMC2 ASCII → columnar JSONL rows.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use hepflat_core::flatten::{EventRow, FlattenOptions, Flattener};
use hepflat_core::sink::{JsonlSink, RowSink};
use hepflat_core::{HepMcReader, ReadError};
use tracing::{info, warn};

/// Progress heartbeat interval, in events.
const PROGRESS_EVERY: u64 = 500;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input HepMC2 file.
    pub input: PathBuf,

    /// Output JSONL path.
    #[arg(default_value = "out.jsonl")]
    pub output: PathBuf,

    /// Emit only per-particle kinematic columns; skip vertex and
    /// adjacency reconstruction.
    #[arg(long)]
    pub flat: bool,

    /// Stop after processing N events.
    #[arg(long, value_name = "N")]
    pub max_events: Option<u64>,
}

pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let input = File::open(&args.input)
        .with_context(|| format!("failed to open input {}", args.input.display()))?;
    let mut reader = HepMcReader::new(BufReader::new(input));

    let mut sink = JsonlSink::create(&args.output)
        .with_context(|| format!("failed to create output {}", args.output.display()))?;

    let mut flattener = Flattener::new(FlattenOptions { flat: args.flat });
    let mut row = EventRow::new();

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        flat = args.flat,
        "converting"
    );

    let mut processed: u64 = 0;
    let mut skipped: u64 = 0;

    while let Some(next) = reader.next_event() {
        if args.max_events.is_some_and(|max| processed >= max) {
            info!(max = args.max_events, "reached event limit");
            break;
        }

        match next {
            Ok(event) => {
                // A dangling vertex reference or a sink failure is fatal:
                // partial output is corrupt by convention.
                flattener
                    .flatten(&event, &mut row)
                    .with_context(|| format!("while flattening event {}", event.number))?;
                sink.write_row(&row)
                    .with_context(|| format!("while writing event {}", event.number))?;
                processed += 1;

                if processed % PROGRESS_EVERY == 0 {
                    info!(processed, skipped, "progress");
                }
            }
            Err(err @ ReadError::Malformed { .. }) => {
                warn!(%err, "skipping malformed event record");
                skipped += 1;
            }
            // An I/O failure repeats on every subsequent call; skipping
            // would loop forever.
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", args.input.display()));
            }
        }
    }

    sink.finish().context("failed to flush output")?;

    info!(processed, skipped, "conversion complete");
    println!(
        "{processed} events processed, {skipped} skipped -> {}",
        args.output.display()
    );
    Ok(())
}
