//! Analysis configuration: JSON file plus command-line overrides.

use anyhow::{Context, Result};
use landgen_analysis::analysis::{Intercept, IsolationConfig, LogitOptions};
use landgen_sim::simulation::ModelParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::args::AnalyzeArgs;
use crate::defaults;

/// Everything an `analyze` run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model construction parameters
    pub model: ModelParams,
    /// Burn-in steps walked before the first snapshot
    pub burn_in: usize,
    /// Main-phase timesteps walked before the analyzed snapshot
    pub timesteps: usize,
    /// Individuals sampled for the distance analysis
    pub sample_size: usize,
    /// Sampling seed; drawn at random when absent
    pub seed: Option<u64>,
    pub env_layers: Vec<usize>,
    /// Principal components used to colour individuals
    pub visual_pcs: usize,
    /// Significance threshold for the geographic coefficient
    pub alpha: f64,
    pub intercept: bool,
    pub max_iter: usize,
    pub tol: f64,
    /// SVG figure path; the 3-D plot goes next to it
    pub output: PathBuf,
    /// Layer whose zero cells are masked on maps
    pub mask_layer: Option<usize>,
    pub phenotype_trait: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: ModelParams {
                database: defaults::DATABASE.into(),
                species: defaults::SPECIES,
            },
            burn_in: defaults::BURN_IN_STEPS,
            timesteps: defaults::TIMESTEPS,
            sample_size: defaults::SAMPLE_SIZE,
            seed: None,
            env_layers: vec![defaults::ENV_LAYER],
            visual_pcs: defaults::VISUAL_PCS,
            alpha: defaults::ALPHA,
            intercept: false,
            max_iter: defaults::MAX_ITER,
            tol: defaults::TOLERANCE,
            output: PathBuf::from(defaults::OUTPUT_FIGURE),
            mask_layer: Some(defaults::MASK_LAYER),
            phenotype_trait: defaults::PHENOTYPE_TRAIT,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Build the configuration for `args`: file values, then flag overrides.
    pub fn resolve(args: &AnalyzeArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &AnalyzeArgs) {
        if let Some(db) = &args.database {
            self.model.database = db.clone();
        }
        if let Some(species) = args.species {
            self.model.species = species;
        }
        if let Some(v) = args.burn_in {
            self.burn_in = v;
        }
        if let Some(v) = args.timesteps {
            self.timesteps = v;
        }
        if let Some(v) = args.sample_size {
            self.sample_size = v;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if let Some(layers) = &args.env_layers {
            self.env_layers = layers.clone();
        }
        if let Some(v) = args.visual_pcs {
            self.visual_pcs = v;
        }
        if let Some(v) = args.alpha {
            self.alpha = v;
        }
        if args.intercept {
            self.intercept = true;
        }
        if let Some(v) = args.max_iter {
            self.max_iter = v;
        }
        if let Some(v) = args.tol {
            self.tol = v;
        }
        if let Some(path) = &args.output {
            self.output = path.clone();
        }
        if args.no_mask {
            self.mask_layer = None;
        } else if let Some(layer) = args.mask_layer {
            self.mask_layer = Some(layer);
        }
        if let Some(v) = args.phenotype_trait {
            self.phenotype_trait = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_size < 2 {
            anyhow::bail!("Sample size must be at least 2, got {}", self.sample_size);
        }
        if self.env_layers.is_empty() {
            anyhow::bail!("At least one environment layer is required");
        }
        if !(0.0..=1.0).contains(&self.alpha) {
            anyhow::bail!("Alpha must lie in [0, 1], got {}", self.alpha);
        }
        if self.max_iter == 0 {
            anyhow::bail!("Max iterations must be positive");
        }
        if !(self.tol > 0.0) {
            anyhow::bail!("Tolerance must be positive, got {}", self.tol);
        }
        if self.visual_pcs == 0 {
            anyhow::bail!("At least one visualization PC is required");
        }
        Ok(())
    }

    /// Settings handed to the isolation pipeline.
    pub fn isolation(&self) -> IsolationConfig {
        IsolationConfig {
            env_layers: self.env_layers.clone(),
            intercept: if self.intercept {
                Intercept::Include
            } else {
                Intercept::Omit
            },
            logit: LogitOptions {
                max_iter: self.max_iter,
                tol: self.tol,
            },
        }
    }
}
