use crate::genome::Genotype;

/// One simulated individual as captured in a population snapshot.
///
/// Besides the genotype, an individual carries its position on the
/// landscape, the environmental value of each landscape layer at that
/// position, and one phenotype value per trait. Records are read-only once
/// built; use the accessors to inspect them.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Identifier, unique within a snapshot
    id: u64,
    genotype: Genotype,
    x: f64,
    y: f64,
    /// One value per environmental layer, in layer order
    env: Vec<f64>,
    /// One value per trait, in trait order
    phenotype: Vec<f64>,
}

impl Individual {
    /// Create a new individual without phenotype values.
    pub fn new(id: u64, genotype: Genotype, location: (f64, f64), env: Vec<f64>) -> Self {
        Self {
            id,
            genotype,
            x: location.0,
            y: location.1,
            env,
            phenotype: Vec::new(),
        }
    }

    /// Attach per-trait phenotype values.
    pub fn with_phenotype(mut self, phenotype: Vec<f64>) -> Self {
        self.phenotype = phenotype;
        self
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Return `(x, y)`.
    #[inline]
    pub fn location(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Environmental values, one per landscape layer.
    #[inline]
    pub fn env(&self) -> &[f64] {
        &self.env
    }

    /// Phenotype values, one per trait. Empty if the simulator recorded none.
    #[inline]
    pub fn phenotype(&self) -> &[f64] {
        &self.phenotype
    }

    /// Phenotype value for a single trait.
    pub fn trait_value(&self, trait_idx: usize) -> Option<f64> {
        self.phenotype.get(trait_idx).copied()
    }
}
