use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Output format of a run summary.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryFormat {
    Pretty,
    Json,
}

/// Which distances `export` writes.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Genetic,
    Geographic,
    Environmental,
    /// All three, plus genetic distances scaled by their maximum
    All,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON configuration file
    ///
    /// Fields missing from the file take their defaults; flags below override
    /// file values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Snapshot database recorded by the simulator [default: simulation.db]
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Species to analyze [default: 0]
    #[arg(short = 's', long)]
    pub species: Option<usize>,

    /// Burn-in steps [default: 20000]
    #[arg(long)]
    pub burn_in: Option<usize>,

    /// Main-phase timesteps walked after burn-in [default: 1000]
    #[arg(short = 'T', long)]
    pub timesteps: Option<usize>,

    /// Individuals sampled for the distance analysis [default: 100]
    #[arg(short = 'n', long)]
    pub sample_size: Option<usize>,

    /// Random seed for sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Environment layers used for environmental distance (e.g. "0,2") [default: 0]
    #[arg(long, value_delimiter = ',')]
    pub env_layers: Option<Vec<usize>>,

    /// Principal components used to colour individuals on maps [default: 3]
    #[arg(long)]
    pub visual_pcs: Option<usize>,

    /// Significance threshold for the geographic coefficient [default: 0.001]
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Fit an intercept in the regression
    ///
    /// By default the regression runs through the origin.
    #[arg(long)]
    pub intercept: bool,

    /// Maximum Newton iterations [default: 35]
    #[arg(long)]
    pub max_iter: Option<usize>,

    /// Convergence tolerance [default: 1e-8]
    #[arg(long)]
    pub tol: Option<f64>,

    /// Figure path [default: IBD_IBE.svg]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Layer whose zero cells are masked on maps [default: 1]
    #[arg(long, conflicts_with = "no_mask")]
    pub mask_layer: Option<usize>,

    /// Draw maps without a mask
    #[arg(long)]
    pub no_mask: bool,

    /// Trait shown on phenotype maps [default: 0]
    #[arg(long = "trait")]
    pub phenotype_trait: Option<usize>,

    /// Skip rendering figures
    #[arg(long)]
    pub no_plot: bool,

    /// Summary format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: SummaryFormat,

    /// Write the summary to a file instead of stdout
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Snapshot database
    #[arg(short, long, default_value = "simulation.db")]
    pub database: PathBuf,

    /// Species to export
    #[arg(short = 's', long, default_value = "0")]
    pub species: usize,

    /// Recorded timestep to export (latest if not specified)
    #[arg(long)]
    pub timestep: Option<usize>,

    /// Distances to export
    #[arg(short, long, value_enum, default_value = "all")]
    pub kind: ExportKind,

    /// Environment layers used for environmental distance
    #[arg(long, value_delimiter = ',', default_value = "0")]
    pub env_layers: Vec<usize>,

    /// Write the full symmetric matrix instead of one row per pair
    ///
    /// Only valid with a single distance kind.
    #[arg(long)]
    pub matrix: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
