//! Pairwise Euclidean distances between individuals
//!
//! Every function here takes a matrix with one row per individual and
//! compares rows.
//!
//! # Ordering
//!
//! Flat distance vectors list each unordered pair once, walking the lower
//! triangle row by row: `(1,0), (2,0), (2,1), (3,0), (3,1), (3,2), ...`.
//! [`pair_indices`] yields the same sequence, so position `k` of any flat
//! vector can be mapped back to the two individuals it compares.

use crate::analysis::features::Features;
use crate::analysis::structure::{pca, speciome};
use crate::errors::AnalysisError;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::iter::FusedIterator;

/// Shape of a distance result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceLayout {
    /// Lower triangle flattened in pair order
    #[default]
    Flat,
    /// Symmetric n × n matrix
    Full,
}

/// Which features distances are computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceKind {
    /// Genotypes projected onto all principal components
    Genetic,
    /// `(x, y)` coordinates
    Geographic,
    /// Values of the selected environmental layers
    Environmental,
}

impl std::fmt::Display for DistanceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceKind::Genetic => write!(f, "genetic"),
            DistanceKind::Geographic => write!(f, "geographic"),
            DistanceKind::Environmental => write!(f, "environmental"),
        }
    }
}

/// Distances in either layout.
#[derive(Debug, Clone, PartialEq)]
pub enum Distances {
    Flat(Vec<f64>),
    Full(DMatrix<f64>),
}

impl Distances {
    /// The flat vector, or `None` for a full matrix.
    pub fn as_flat(&self) -> Option<&[f64]> {
        match self {
            Distances::Flat(v) => Some(v),
            Distances::Full(_) => None,
        }
    }

    /// The full matrix, or `None` for a flat vector.
    pub fn as_matrix(&self) -> Option<&DMatrix<f64>> {
        match self {
            Distances::Flat(_) => None,
            Distances::Full(m) => Some(m),
        }
    }

    /// Convert to the flat layout.
    pub fn into_flat(self) -> Vec<f64> {
        match self {
            Distances::Flat(v) => v,
            Distances::Full(m) => {
                let n = m.nrows();
                pair_indices(n).map(|(i, j)| m[(i, j)]).collect()
            }
        }
    }
}

/// Number of unordered pairs among `n` individuals.
#[inline]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Pair indices `(i, j)` with `j < i`, in flat distance order.
pub fn pair_indices(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(|i| (0..i).map(move |j| (i, j)))
}

#[inline]
fn row_distance(points: &DMatrix<f64>, i: usize, j: usize) -> f64 {
    points
        .row(i)
        .iter()
        .zip(points.row(j).iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

/// Compute each lower-triangle row in parallel, checking self distances.
fn lower_rows(points: &DMatrix<f64>) -> Result<Vec<Vec<f64>>, AnalysisError> {
    let n = points.nrows();
    let rows: Vec<(Vec<f64>, f64)> = (0..n)
        .into_par_iter()
        .map(|i| {
            let row = (0..i).map(|j| row_distance(points, i, j)).collect();
            (row, row_distance(points, i, i))
        })
        .collect();

    let mut out = Vec::with_capacity(n);
    for (index, (row, diagonal)) in rows.into_iter().enumerate() {
        if diagonal != 0.0 {
            return Err(AnalysisError::NonZeroDiagonal {
                index,
                value: diagonal,
            });
        }
        out.push(row);
    }
    Ok(out)
}

/// Calculate pairwise distances between all rows, flattened in pair order.
///
/// # Arguments
///
/// * `points` - n × d matrix, one row per individual
///
/// # Returns
///
/// Vector of length `n(n-1)/2`; empty for fewer than two individuals.
///
/// # Errors
///
/// Returns [`AnalysisError::NonZeroDiagonal`] when a row is not at distance
/// zero from itself, which happens for non-finite features.
///
/// # Examples
///
/// ```
/// use landgen_analysis::analysis::distance::pairwise_distances;
/// use nalgebra::DMatrix;
///
/// let points = DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 3.0, 4.0, 0.0, 1.0]);
/// let d = pairwise_distances(&points).unwrap();
/// assert_eq!(d, vec![5.0, 1.0, 18.0_f64.sqrt()]);
/// ```
pub fn pairwise_distances(points: &DMatrix<f64>) -> Result<Vec<f64>, AnalysisError> {
    let n = points.nrows();
    let flat: Vec<f64> = lower_rows(points)?.into_iter().flatten().collect();
    if flat.len() != pair_count(n) {
        return Err(AnalysisError::LengthMismatch {
            expected: pair_count(n),
            actual: flat.len(),
        });
    }
    Ok(flat)
}

/// Calculate the full symmetric distance matrix.
///
/// # Returns
///
/// n × n matrix with zero diagonal where entry `(i, j)` is the distance
/// between rows `i` and `j`.
pub fn distance_matrix(points: &DMatrix<f64>) -> Result<DMatrix<f64>, AnalysisError> {
    let n = points.nrows();
    let rows = lower_rows(points)?;
    let mut matrix = DMatrix::zeros(n, n);
    for (i, row) in rows.iter().enumerate() {
        for (j, &d) in row.iter().enumerate() {
            matrix[(i, j)] = d;
            matrix[(j, i)] = d;
        }
    }
    Ok(matrix)
}

/// Calculate distances of one kind between the individuals of `features`.
///
/// Genetic distances are measured between genotypes projected onto every
/// principal component, which equals the Euclidean distance between
/// dosage vectors.
pub fn calc_dists(
    features: &Features,
    kind: DistanceKind,
    layout: DistanceLayout,
) -> Result<Distances, AnalysisError> {
    let genetic;
    let points = match kind {
        DistanceKind::Genetic => {
            genetic = if features.is_empty() {
                DMatrix::zeros(0, 0)
            } else {
                pca(&speciome(&features.genotypes), None)?.scores
            };
            &genetic
        }
        DistanceKind::Geographic => &features.coords,
        DistanceKind::Environmental => &features.env,
    };

    match layout {
        DistanceLayout::Flat => pairwise_distances(points).map(Distances::Flat),
        DistanceLayout::Full => distance_matrix(points).map(Distances::Full),
    }
}

/// Lazy iterator over `(i, j, distance)` in flat pair order.
///
/// Computes one distance per step, so memory stays constant no matter how
/// many individuals are compared.
pub struct LowerTriangle<'a> {
    points: &'a DMatrix<f64>,
    i: usize,
    j: usize,
}

impl<'a> LowerTriangle<'a> {
    pub fn new(points: &'a DMatrix<f64>) -> Self {
        Self { points, i: 1, j: 0 }
    }

    fn remaining(&self) -> usize {
        let n = self.points.nrows();
        if self.i >= n {
            return 0;
        }
        pair_count(n) - (pair_count(self.i) + self.j)
    }
}

impl Iterator for LowerTriangle<'_> {
    type Item = (usize, usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.i >= self.points.nrows() {
            return None;
        }
        let (i, j) = (self.i, self.j);
        self.j += 1;
        if self.j == self.i {
            self.i += 1;
            self.j = 0;
        }
        Some((i, j, row_distance(self.points, i, j)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for LowerTriangle<'_> {}
impl FusedIterator for LowerTriangle<'_> {}
