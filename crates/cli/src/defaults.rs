//! Shared default values for analysis configuration.
//! These values are used both by [`crate::config::AnalysisConfig`] and by the
//! clap help text.

pub const DATABASE: &str = "simulation.db";
pub const SPECIES: usize = 0;

pub const BURN_IN_STEPS: usize = 20_000;
pub const TIMESTEPS: usize = 1000;
pub const SAMPLE_SIZE: usize = 100;

pub const ENV_LAYER: usize = 0;
pub const MASK_LAYER: usize = 1;
pub const PHENOTYPE_TRAIT: usize = 0;
pub const VISUAL_PCS: usize = 3;

// Regression
pub const ALPHA: f64 = 0.001;
pub const MAX_ITER: usize = 35;
pub const TOLERANCE: f64 = 1e-8;

pub const OUTPUT_FIGURE: &str = "IBD_IBE.svg";
