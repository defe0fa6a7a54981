//! # Analysis Crate
//!
//! Isolation-by-distance and isolation-by-environment analysis of population
//! snapshots: feature extraction, genotype PCA, pairwise distances, and the
//! logit regression of genetic on geographic and environmental distance.

pub mod analysis;
pub mod errors;

pub use errors::{AnalysisError, RegressionError};
