//! Capability interface of an agent-based simulation model.
//!
//! The simulation engine itself lives outside this workspace. Analyses only
//! need to advance a model and read its current state, so they are written
//! against [`Model`] and never against a concrete engine.

use crate::errors::ModelError;
use crate::simulation::{Landscape, Species};
use serde::{Deserialize, Serialize};

/// How a call to [`Model::walk`] advances the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkMode {
    /// Burn-in: run demography until the model reaches its starting state.
    /// Burn-in steps do not advance the main timestep counter.
    Burn,
    /// Main run: evolve for the given number of timesteps.
    Main,
}

/// A simulation model that can be advanced and inspected.
pub trait Model {
    /// Advance the model by `steps` in the given mode.
    fn walk(&mut self, steps: usize, mode: WalkMode) -> Result<(), ModelError>;

    /// Current main-run timestep.
    fn timestep(&self) -> usize;

    /// Snapshot of the focal species at the current timestep.
    fn species(&self) -> &Species;

    /// Landscape the species lives on.
    fn landscape(&self) -> &Landscape;
}
