//! Feature extraction from population snapshots.
//!
//! Turns a [`Species`] into the numeric arrays the rest of the analysis
//! works on: a genotype array, a coordinate matrix and an environment
//! matrix, all in the snapshot's id order.

use crate::errors::AnalysisError;
use landgen_sim::simulation::Species;
use nalgebra::DMatrix;

/// Dense genotype array of shape individuals × loci × ploidy.
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeArray {
    n_individuals: usize,
    n_loci: usize,
    ploidy: usize,
    /// Individual-major, then locus-major alleles
    alleles: Vec<u8>,
}

impl GenotypeArray {
    /// Return `(individuals, loci, ploidy)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_individuals, self.n_loci, self.ploidy)
    }

    /// Allele carried by `individual` at `locus` on chromosome copy `copy`.
    pub fn get(&self, individual: usize, locus: usize, copy: usize) -> Option<u8> {
        if individual >= self.n_individuals || locus >= self.n_loci || copy >= self.ploidy {
            return None;
        }
        let idx = (individual * self.n_loci + locus) * self.ploidy + copy;
        self.alleles.get(idx).copied()
    }

    /// Alleles of one individual, locus-major.
    pub fn individual(&self, idx: usize) -> Option<&[u8]> {
        let width = self.n_loci * self.ploidy;
        let start = idx.checked_mul(width)?;
        if idx >= self.n_individuals {
            return None;
        }
        self.alleles.get(start..start + width)
    }

    /// Raw allele buffer, individual-major then locus-major.
    pub fn as_slice(&self) -> &[u8] {
        &self.alleles
    }
}

/// Numeric features of a snapshot, row `i` describing `ids[i]`.
#[derive(Debug, Clone)]
pub struct Features {
    /// Individual ids in row order
    pub ids: Vec<u64>,
    pub genotypes: GenotypeArray,
    /// n × 2 matrix of `(x, y)`
    pub coords: DMatrix<f64>,
    /// n × |layers| matrix of environmental values
    pub env: DMatrix<f64>,
    /// Landscape layers the `env` columns were taken from
    pub env_layers: Vec<usize>,
}

impl Features {
    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Extract genotype, coordinate and environment features from a snapshot.
///
/// # Arguments
///
/// * `species` - The snapshot to read
/// * `env_layers` - Landscape layers whose values make up the environment matrix
///
/// # Errors
///
/// Returns [`AnalysisError::MalformedSnapshot`] when an individual has no
/// loci, a genotype shape different from the first individual, lacks a
/// requested layer, sits at a non-finite coordinate, or carries an
/// environmental value outside `[0, 1]`.
pub fn extract_features(
    species: &Species,
    env_layers: &[usize],
) -> Result<Features, AnalysisError> {
    let n = species.size();
    let (n_loci, ploidy) = species
        .iter()
        .next()
        .map(|ind| (ind.genotype().n_loci(), ind.genotype().ploidy()))
        .unwrap_or((0, 0));

    let mut ids = Vec::with_capacity(n);
    let mut alleles = Vec::with_capacity(n * n_loci * ploidy);
    let mut coords = DMatrix::zeros(n, 2);
    let mut env = DMatrix::zeros(n, env_layers.len());

    for (row, ind) in species.iter().enumerate() {
        let id = ind.id();
        let genotype = ind.genotype();
        if genotype.n_loci() == 0 {
            return Err(malformed(id, "genotype has no loci"));
        }
        if genotype.n_loci() != n_loci || genotype.ploidy() != ploidy {
            return Err(malformed(
                id,
                format!(
                    "genotype is {}x{}, expected {n_loci}x{ploidy}",
                    genotype.n_loci(),
                    genotype.ploidy()
                ),
            ));
        }
        let (x, y) = ind.location();
        if !x.is_finite() || !y.is_finite() {
            return Err(malformed(id, format!("non-finite location ({x}, {y})")));
        }

        for (col, &layer) in env_layers.iter().enumerate() {
            let value = ind
                .env()
                .get(layer)
                .copied()
                .ok_or_else(|| malformed(id, format!("missing environment layer {layer}")))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(malformed(
                    id,
                    format!("environment value {value} on layer {layer} outside [0, 1]"),
                ));
            }
            env[(row, col)] = value;
        }

        ids.push(id);
        alleles.extend_from_slice(genotype.as_slice());
        coords[(row, 0)] = x;
        coords[(row, 1)] = y;
    }

    Ok(Features {
        ids,
        genotypes: GenotypeArray {
            n_individuals: n,
            n_loci,
            ploidy,
            alleles,
        },
        coords,
        env,
        env_layers: env_layers.to_vec(),
    })
}

fn malformed(id: u64, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::MalformedSnapshot {
        id,
        reason: reason.into(),
    }
}
