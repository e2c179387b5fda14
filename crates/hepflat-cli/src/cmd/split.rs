//! `hepflat split`: redistribute one HepMC2 stream into fixed-size chunks.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use hepflat_core::{HepMcReader, HepMcWriter, ReadError};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input HepMC2 file.
    pub input: PathBuf,

    /// Base name for output files (`<base>.0`, `<base>.1`, ...).
    /// Defaults to the input path.
    pub base: Option<PathBuf>,

    /// Events per output file. Omitted: every event goes to `<base>.0`.
    #[arg(short, long, value_name = "E")]
    pub events_per_file: Option<u64>,

    /// Process only the first N events.
    #[arg(short = 'n', long, value_name = "N")]
    pub max_events: Option<u64>,
}

pub fn run_split(args: &SplitArgs) -> Result<()> {
    anyhow::ensure!(
        args.events_per_file != Some(0),
        "events per file must be positive"
    );

    let base = args.base.clone().unwrap_or_else(|| args.input.clone());
    let file = File::open(&args.input)
        .with_context(|| format!("failed to open input {}", args.input.display()))?;
    let mut reader = HepMcReader::new(BufReader::new(file));

    info!(input = %args.input.display(), base = %base.display(), "splitting");

    let mut writer: Option<HepMcWriter<BufWriter<File>>> = None;
    let mut chunk_index: u64 = 0;
    let mut total: u64 = 0;
    let mut skipped: u64 = 0;

    while let Some(next) = reader.next_event() {
        if args.max_events.is_some_and(|max| total >= max) {
            break;
        }

        let event = match next {
            Ok(event) => event,
            Err(err @ ReadError::Malformed { .. }) => {
                warn!(%err, "skipping malformed event record");
                skipped += 1;
                continue;
            }
            // An I/O failure repeats on every subsequent call; skipping
            // would loop forever.
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read {}", args.input.display()));
            }
        };

        // Rotate to a fresh chunk when the current one is full. Without a
        // chunk size the single chunk never fills.
        if let Some(per_file) = args.events_per_file
            && writer
                .as_ref()
                .is_some_and(|w| w.events_written() >= per_file)
            && let Some(full) = writer.take()
        {
            full.finish().context("failed to close chunk")?;
        }

        let out = match writer.as_mut() {
            Some(out) => out,
            None => {
                let path = PathBuf::from(format!("{}.{chunk_index}", base.display()));
                chunk_index += 1;
                info!(chunk = %path.display(), "opening chunk");
                let file = File::create(&path)
                    .with_context(|| format!("failed to create chunk {}", path.display()))?;
                writer.insert(HepMcWriter::new(BufWriter::new(file)))
            }
        };

        out.write_event(&event).context("failed to write event")?;
        total += 1;
    }

    if let Some(out) = writer.take() {
        out.finish().context("failed to close final chunk")?;
    }

    info!(total, chunks = chunk_index, skipped, "split complete");
    println!("{total} events split over {chunk_index} files");
    Ok(())
}
