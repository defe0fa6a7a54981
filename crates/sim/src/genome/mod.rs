//! Genotypes and individual records.

mod genotype;
mod individual;

pub use genotype::{DIPLOID, Genotype};
pub use individual::Individual;
