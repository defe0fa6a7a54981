//! Isolation-by-distance and isolation-by-environment analysis
//!
//! This module provides:
//! - Feature extraction from population snapshots
//! - Genotype PCA
//! - Pairwise Euclidean distances with a fixed pair order
//! - Logit regression of genetic on geographic and environmental distance
//! - The combined IBD/IBE pipeline

pub mod distance;
pub mod features;
pub mod isolation;
pub mod regression;
pub mod structure;
pub mod utils;

// Re-export commonly used functions
pub use distance::{
    DistanceKind, DistanceLayout, Distances, LowerTriangle, calc_dists, distance_matrix,
    pair_indices, pairwise_distances,
};
pub use features::{Features, GenotypeArray, extract_features};
pub use isolation::{DistanceSummary, IsolationAnalysis, IsolationConfig, IsolationResult};
pub use regression::{Intercept, LogitOptions, LogitResults, fit_logit};
pub use structure::{Pca, normalize_columns, pca, speciome};
pub use utils::normalize_by_max;
