//! # Simulation Crate
//!
//! The `sim` crate holds everything this workspace knows about the external
//! agent-based simulator: the individual and snapshot data model, the
//! landscape, the [`simulation::Model`] capability trait, and the SQLite
//! store through which recorded runs are replayed.

pub mod errors;
pub mod genome;
pub mod prelude;
pub mod simulation;
pub mod storage;

pub use genome::{Genotype, Individual};
pub use simulation::{Landscape, Model, Species, WalkMode};
