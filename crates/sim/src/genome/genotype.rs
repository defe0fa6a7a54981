use crate::errors::SnapshotError;

/// Ploidy of every individual produced by the simulator.
pub const DIPLOID: usize = 2;

/// Biallelic genotype of one individual.
///
/// Alleles are stored locus-major: the `ploidy` alleles of locus 0, then the
/// alleles of locus 1, and so on. Each allele is 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    alleles: Vec<u8>,
    ploidy: usize,
}

impl Genotype {
    /// Build a diploid genotype from per-locus allele pairs.
    pub fn new(loci: &[[u8; DIPLOID]]) -> Result<Self, SnapshotError> {
        let alleles: Vec<u8> = loci.iter().flatten().copied().collect();
        Self::from_flat(alleles, DIPLOID)
    }

    /// Build a genotype from a flat locus-major allele buffer.
    pub fn from_flat(alleles: Vec<u8>, ploidy: usize) -> Result<Self, SnapshotError> {
        if ploidy == 0 || !alleles.len().is_multiple_of(ploidy) {
            return Err(SnapshotError::RaggedGenotype {
                len: alleles.len(),
                ploidy,
            });
        }
        if let Some(pos) = alleles.iter().position(|&a| a > 1) {
            return Err(SnapshotError::InvalidAllele {
                locus: pos / ploidy,
                allele: alleles[pos],
            });
        }
        Ok(Self { alleles, ploidy })
    }

    /// Number of loci.
    #[inline]
    pub fn n_loci(&self) -> usize {
        self.alleles.len() / self.ploidy
    }

    #[inline]
    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    /// Raw locus-major allele buffer.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.alleles
    }

    /// Alleles carried at one locus.
    pub fn locus(&self, idx: usize) -> Option<&[u8]> {
        let start = idx.checked_mul(self.ploidy)?;
        self.alleles.get(start..start + self.ploidy)
    }
}
