mod args;
mod commands;
mod config;
pub mod defaults;
mod printing;
mod render;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use args::{AnalyzeArgs, ExportArgs};
use commands::{analyze, export, inspect};

/// Landgen: isolation by distance and environment on simulated landscapes
///
/// Replays a simulation recorded in a snapshot database, samples the
/// population and tests whether genetic distance grows with geographic and
/// environmental distance.
#[derive(Parser, Debug)]
#[command(name = "landgen")]
#[command(author, version, about = "Tests simulated populations for IBD and IBE", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the IBD/IBE analysis on a recorded simulation.
    ///
    /// Burns the model in, walks the main phase, samples individuals, fits
    /// genetic ~ geographic + environmental distance and draws the figure.
    Analyze(Box<AnalyzeArgs>),

    /// Info: Show what a snapshot database contains.
    Info {
        /// Database path
        #[arg(short, long, default_value = "simulation.db")]
        database: PathBuf,
    },

    /// Export pairwise distances of one recorded timestep as CSV.
    ///
    /// Use this to get data out for analysis in Python, R, or other tools.
    Export(ExportArgs),
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Analyze(args) => {
            analyze::run_analysis(&args)?;
        }
        Commands::Info { database } => {
            inspect::show_info(&database)?;
        }
        Commands::Export(args) => {
            export::export_distances(&args)?;
        }
    }

    Ok(())
}
