//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use landgen_sim::prelude::*;
//!
//! let genotype = Genotype::new(&[[0, 1], [1, 1]]).unwrap();
//! let ind = Individual::new(0, genotype, (1.0, 2.0), vec![0.5]);
//! let species = Species::new("spp", 0, vec![ind]).unwrap();
//! assert_eq!(species.size(), 1);
//! ```

pub use crate::errors::{self, ModelError, SnapshotError};
pub use crate::genome::{Genotype, Individual};
pub use crate::simulation::{Landscape, Model, ModelParams, RecordedModel, Species, WalkMode};
