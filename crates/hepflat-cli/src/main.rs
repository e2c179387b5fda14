#![forbid(unsafe_code)]

mod cmd;

use std::env;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hepflat: flatten and reshape HepMC2 event files",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Flatten a HepMC2 file into columnar JSONL rows",
        long_about = "Read HepMC2 ASCII events and write one densely-indexed \
                      columnar row per event as JSON lines.",
        after_help = "EXAMPLES:\n    # Convert with full vertex/adjacency columns\n    hepflat convert events.hepmc rows.jsonl\n\n    # Kinematics-only rows, first 1000 events\n    hepflat convert events.hepmc rows.jsonl --flat --max-events 1000"
    )]
    Convert(cmd::convert::ConvertArgs),

    #[command(
        about = "Merge several HepMC2 files into one",
        after_help = "EXAMPLES:\n    # Merge three runs\n    hepflat merge run1.hepmc run2.hepmc run3.hepmc -o merged.hepmc"
    )]
    Merge(cmd::merge::MergeArgs),

    #[command(
        about = "Split one HepMC2 file into several",
        after_help = "EXAMPLES:\n    # 5000 events per output file\n    hepflat split big.hepmc chunk -e 5000"
    )]
    Split(cmd::split::SplitArgs),

    #[command(
        about = "Remove particles from HepMC2 files by PDG id",
        after_help = "EXAMPLES:\n    # Drop neutrinos\n    hepflat prune events.hepmc -o slim.hepmc -d 12 -d 14 -d 16\n\n    # Keep only muons (everything else is removed)\n    hepflat prune events.hepmc -o muons.hepmc -k 13"
    )]
    Prune(cmd::prune::PruneArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HEPFLAT_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "hepflat=debug,info"
        } else {
            "hepflat=info,warn"
        })
    });

    let format = env::var("HEPFLAT_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Convert(args) => cmd::convert::run_convert(&args),
        Commands::Merge(args) => cmd::merge::run_merge(&args),
        Commands::Split(args) => cmd::split::run_split(&args),
        Commands::Prune(args) => cmd::prune::run_prune(&args),
    }
}
