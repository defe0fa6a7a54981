//! Isolation by distance (IBD) and isolation by environment (IBE).
//!
//! The pipeline extracts features from a snapshot, measures genetic
//! distances in full-rank PC space, scales them by their maximum, and fits
//! a logit regression on geographic and environmental distances.

use crate::analysis::distance::{DistanceKind, DistanceLayout, calc_dists};
use crate::analysis::features::extract_features;
use crate::analysis::regression::{Intercept, LogitOptions, LogitResults, fit_logit};
use crate::analysis::utils::{mean, median, normalize_by_max, std_dev};
use crate::errors::AnalysisError;
use landgen_sim::simulation::Species;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Name of the geographic regressor.
pub const GEO: &str = "geo";
/// Name of the environmental regressor.
pub const ENV: &str = "env";

/// Settings for an isolation analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationConfig {
    /// Landscape layers used for environmental distance
    pub env_layers: Vec<usize>,
    pub intercept: Intercept,
    pub logit: LogitOptions,
}

impl Default for IsolationConfig {
    fn default() -> Self {
        Self {
            env_layers: vec![0],
            intercept: Intercept::Omit,
            logit: LogitOptions::default(),
        }
    }
}

/// Summary statistics of a distance vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl DistanceSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: mean(values),
            median: median(&mut sorted),
            std_dev: std_dev(values),
        }
    }
}

/// Distances and fitted regression for one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct IsolationResult {
    /// Timestep of the analyzed snapshot
    pub timestep: usize,
    /// Individual ids, defining the pair order of every distance vector
    pub ids: Vec<u64>,
    pub gen_dists: Vec<f64>,
    /// Genetic distances divided by their maximum
    pub scaled_gen_dists: Vec<f64>,
    pub geo_dists: Vec<f64>,
    pub env_dists: Vec<f64>,
    pub fit: LogitResults,
}

impl IsolationResult {
    /// Number of compared pairs.
    pub fn n_pairs(&self) -> usize {
        self.scaled_gen_dists.len()
    }

    /// Fail unless the geographic coefficient's p-value is below `alpha`.
    ///
    /// Returns the p-value on success.
    pub fn check_significance(&self, alpha: f64) -> Result<f64, AnalysisError> {
        let p_value = self
            .fit
            .coefficient(GEO)
            .map(|c| c.p_value)
            .unwrap_or(f64::NAN);
        if p_value < alpha {
            Ok(p_value)
        } else {
            Err(AnalysisError::NotSignificant {
                name: GEO.to_string(),
                p_value,
                alpha,
            })
        }
    }

    pub fn geo_summary(&self) -> DistanceSummary {
        DistanceSummary::from_values(&self.geo_dists)
    }

    pub fn env_summary(&self) -> DistanceSummary {
        DistanceSummary::from_values(&self.env_dists)
    }

    pub fn gen_summary(&self) -> DistanceSummary {
        DistanceSummary::from_values(&self.gen_dists)
    }
}

/// Runs the IBD/IBE pipeline on species snapshots.
#[derive(Debug, Clone, Default)]
pub struct IsolationAnalysis {
    config: IsolationConfig,
}

impl IsolationAnalysis {
    pub fn new(config: IsolationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IsolationConfig {
        &self.config
    }

    /// Analyze one snapshot.
    ///
    /// # Errors
    ///
    /// Propagates malformed snapshots, degenerate distances and regression
    /// failures. Significance is checked separately with
    /// [`IsolationResult::check_significance`].
    pub fn run(&self, species: &Species) -> Result<IsolationResult, AnalysisError> {
        let features = extract_features(species, &self.config.env_layers)?;

        let gen_dists =
            calc_dists(&features, DistanceKind::Genetic, DistanceLayout::Flat)?.into_flat();
        let scaled_gen_dists = normalize_by_max(&gen_dists)?;
        let geo_dists =
            calc_dists(&features, DistanceKind::Geographic, DistanceLayout::Flat)?.into_flat();
        let env_dists =
            calc_dists(&features, DistanceKind::Environmental, DistanceLayout::Flat)?.into_flat();

        for (name, dists) in [("geographic", &geo_dists), ("environmental", &env_dists)] {
            if dists.len() != scaled_gen_dists.len() {
                return Err(AnalysisError::LengthMismatch {
                    expected: scaled_gen_dists.len(),
                    actual: dists.len(),
                });
            }
            debug!(kind = name, pairs = dists.len(), "computed distances");
        }

        let fit = fit_logit(
            &scaled_gen_dists,
            &[(GEO, &geo_dists), (ENV, &env_dists)],
            self.config.intercept,
            &self.config.logit,
        )?;

        info!(
            timestep = species.timestep(),
            individuals = features.len(),
            pairs = scaled_gen_dists.len(),
            prsquared = fit.prsquared,
            iterations = fit.iterations,
            "fitted isolation regression"
        );

        Ok(IsolationResult {
            timestep: species.timestep(),
            ids: features.ids,
            gen_dists,
            scaled_gen_dists,
            geo_dists,
            env_dists,
            fit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RegressionError;
    use landgen_sim::genome::{Genotype, Individual};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// Individuals on a line whose allele frequencies follow position, so
    /// genetic distance tracks geographic distance.
    fn cline(n: u64, loci: usize, seed: u64) -> Species {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let individuals = (0..n)
            .map(|id| {
                let x = id as f64 / (n - 1) as f64 * 10.0;
                let freq = x / 10.0;
                let pairs: Vec<[u8; 2]> = (0..loci)
                    .map(|_| {
                        [
                            u8::from(rng.random_bool(freq)),
                            u8::from(rng.random_bool(freq)),
                        ]
                    })
                    .collect();
                let y: f64 = rng.random_range(0.0..1.0);
                let env = vec![rng.random_range(0.0..1.0), (x / 10.0).clamp(0.0, 1.0)];
                Individual::new(id, Genotype::new(&pairs).unwrap(), (x, y), env)
            })
            .collect();
        Species::new("cline", 7, individuals).unwrap()
    }

    #[test]
    fn test_run_on_cline() {
        let species = cline(40, 60, 42);
        let result = IsolationAnalysis::default().run(&species).unwrap();

        assert_eq!(result.timestep, 7);
        assert_eq!(result.ids.len(), 40);
        assert_eq!(result.n_pairs(), 40 * 39 / 2);
        assert_eq!(result.geo_dists.len(), result.n_pairs());
        assert_eq!(result.env_dists.len(), result.n_pairs());
        assert!(result.scaled_gen_dists.iter().all(|d| (0.0..=1.0).contains(d)));
        assert!(result.scaled_gen_dists.contains(&1.0));

        assert_eq!(result.fit.names, vec![GEO, ENV]);
        assert!(result.fit.coefficient(GEO).unwrap().estimate > 0.0);
        let p = result.check_significance(1e-3).unwrap();
        assert!(p < 1e-3);
    }

    #[test]
    fn test_significance_threshold() {
        let result = IsolationAnalysis::default().run(&cline(30, 40, 1)).unwrap();
        match result.check_significance(0.0) {
            Err(AnalysisError::NotSignificant { name, alpha, .. }) => {
                assert_eq!(name, GEO);
                assert_eq!(alpha, 0.0);
            }
            other => panic!("expected significance failure, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic() {
        let species = cline(25, 30, 5);
        let analysis = IsolationAnalysis::default();
        let a = analysis.run(&species).unwrap();
        let b = analysis.run(&species).unwrap();
        assert_eq!(a.gen_dists, b.gen_dists);
        assert_eq!(a.fit.params, b.fit.params);
    }

    #[test]
    fn test_identical_genotypes_are_degenerate() {
        let individuals = (0..5)
            .map(|id| {
                Individual::new(
                    id,
                    Genotype::new(&[[1, 0], [0, 0]]).unwrap(),
                    (id as f64, 0.0),
                    vec![0.5],
                )
            })
            .collect();
        let species = Species::new("clones", 0, individuals).unwrap();
        assert!(matches!(
            IsolationAnalysis::default().run(&species),
            Err(AnalysisError::DegenerateDistances(_))
        ));
    }

    #[test]
    fn test_single_individual_has_no_pairs() {
        let species = Species::new(
            "one",
            0,
            vec![Individual::new(0, Genotype::new(&[[0, 1]]).unwrap(), (0.0, 0.0), vec![0.5])],
        )
        .unwrap();
        assert!(matches!(
            IsolationAnalysis::default().run(&species),
            Err(AnalysisError::DegenerateDistances(_))
        ));
    }

    #[test]
    fn test_non_convergence_surfaces() {
        let config = IsolationConfig {
            logit: LogitOptions {
                max_iter: 1,
                tol: 1e-15,
            },
            ..IsolationConfig::default()
        };
        let err = IsolationAnalysis::new(config).run(&cline(20, 20, 3)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Regression(RegressionError::NotConverged { .. })
        ));
    }

    #[test]
    fn test_distance_summary() {
        let summary = DistanceSummary::from_values(&[3.0, 1.0, 2.0]);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.median, 2.0);
    }
}
