//! Population structure analysis
//!
//! Reduces genotypes to principal components. Distances between individuals
//! in full-rank PC space are the genetic distances used by the isolation
//! analysis; the leading components colour individuals on maps.

use crate::analysis::features::GenotypeArray;
use crate::errors::AnalysisError;
use nalgebra::DMatrix;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Result of a principal component analysis.
#[derive(Debug, Clone, Serialize)]
pub struct Pca {
    /// n × k matrix of component scores
    pub scores: DMatrix<f64>,
    /// Singular values of the centred data, descending
    pub singular_values: Vec<f64>,
    /// Variance explained by each returned component
    pub explained_variance: Vec<f64>,
    /// Fraction of total variance explained by each returned component
    pub explained_variance_ratio: Vec<f64>,
}

impl Pca {
    /// Number of components returned.
    pub fn n_components(&self) -> usize {
        self.scores.ncols()
    }
}

/// Average the ploidy axis of a genotype array.
///
/// # Returns
///
/// n × loci matrix where entry `(i, l)` is the mean allele of individual `i`
/// at locus `l`, i.e. the allele dosage scaled to `[0, 1]`.
pub fn speciome(genotypes: &GenotypeArray) -> DMatrix<f64> {
    let (n, loci, ploidy) = genotypes.shape();
    let alleles = genotypes.as_slice();
    DMatrix::from_fn(n, loci, |i, l| {
        let start = (i * loci + l) * ploidy;
        let sum: u32 = alleles[start..start + ploidy].iter().map(|&a| a as u32).sum();
        sum as f64 / ploidy as f64
    })
}

/// Perform PCA on a data matrix with one row per individual.
///
/// Columns are mean-centred and decomposed by SVD. Scores are `U·S`, sorted
/// by decreasing singular value. Each score column is oriented so that its
/// largest-magnitude entry in `U` is positive, which makes the output
/// deterministic for identical input.
///
/// # Arguments
///
/// * `data` - n × p matrix, one row per individual
/// * `n_components` - Number of components to keep; `None` keeps the full
///   rank `min(n, p)`, which preserves all pairwise Euclidean distances
///
/// # Errors
///
/// Returns [`AnalysisError::Pca`] for an empty matrix or non-finite input.
pub fn pca(data: &DMatrix<f64>, n_components: Option<usize>) -> Result<Pca, AnalysisError> {
    let (n, p) = data.shape();
    if n == 0 || p == 0 {
        return Err(AnalysisError::Pca(format!("cannot decompose a {n}x{p} matrix")));
    }
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::Pca("input contains non-finite values".to_string()));
    }

    let rank = n.min(p);
    let k = n_components.map_or(rank, |c| c.min(rank));

    let means: Vec<f64> = (0..p).map(|j| data.column(j).mean()).collect();
    let centred = DMatrix::from_fn(n, p, |i, j| data[(i, j)] - means[j]);

    let svd = centred.svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| AnalysisError::Pca("SVD did not produce left singular vectors".to_string()))?;
    let s = svd.singular_values;

    let mut order: Vec<usize> = (0..s.len()).collect();
    order.sort_by(|&a, &b| {
        s[b].partial_cmp(&s[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let signs: Vec<f64> = order
        .iter()
        .take(k)
        .map(|&comp| {
            let col = u.column(comp);
            let mut best = 0;
            for i in 1..col.len() {
                if col[i].abs() > col[best].abs() {
                    best = i;
                }
            }
            if col[best] < 0.0 { -1.0 } else { 1.0 }
        })
        .collect();

    let scores = DMatrix::from_fn(n, k, |i, c| {
        let comp = order[c];
        u[(i, comp)] * s[comp] * signs[c]
    });

    let dof = if n > 1 { (n - 1) as f64 } else { 1.0 };
    let all_variance: Vec<f64> = order.iter().map(|&comp| s[comp] * s[comp] / dof).collect();
    let total: f64 = all_variance.iter().sum();
    let explained_variance: Vec<f64> = all_variance[..k].to_vec();
    let explained_variance_ratio = explained_variance
        .iter()
        .map(|v| if total > 0.0 { v / total } else { 0.0 })
        .collect();

    debug!(individuals = n, features = p, components = k, "computed PCA");

    Ok(Pca {
        scores,
        singular_values: order.iter().take(k).map(|&comp| s[comp]).collect(),
        explained_variance,
        explained_variance_ratio,
    })
}

/// Min-max scale every column to `[0, 1]`.
///
/// Constant columns map to 0. Used to turn the leading PC scores into RGB
/// colours.
pub fn normalize_columns(matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = matrix.clone();
    for mut col in out.column_iter_mut() {
        let min = col.min();
        let max = col.max();
        let range = max - min;
        for v in col.iter_mut() {
            *v = if range > 0.0 { (*v - min) / range } else { 0.0 };
        }
    }
    out
}
