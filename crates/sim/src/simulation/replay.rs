//! A [`Model`] that replays a run recorded in a snapshot database.

use crate::errors::{DatabaseError, ModelError};
use crate::simulation::{Landscape, Model, Species, WalkMode};
use crate::storage::QueryBuilder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Parameter specification for constructing a [`RecordedModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    /// Snapshot database written by the simulator
    pub database: PathBuf,
    /// Focal species id
    #[serde(default)]
    pub species: usize,
}

impl ModelParams {
    pub fn new(database: impl Into<PathBuf>) -> Self {
        Self {
            database: database.into(),
            species: 0,
        }
    }
}

/// Replays recorded snapshots through the [`Model`] interface.
///
/// The simulator has already done the work; walking the model moves a
/// clock forward and exposes the latest snapshot recorded at or before it.
pub struct RecordedModel {
    query: QueryBuilder,
    species_id: usize,
    name: String,
    landscape: Landscape,
    /// Recorded timesteps of the focal species, ascending
    recorded: Vec<usize>,
    burn_in_complete: bool,
    burn_in_steps: Option<usize>,
    burned_in: bool,
    timestep: usize,
    species: Species,
}

impl RecordedModel {
    /// Open the database named by `params` and prepare the focal species.
    pub fn from_params(params: &ModelParams) -> Result<Self, ModelError> {
        let query = QueryBuilder::new(&params.database)?;

        let landscape = query.get_landscape()?.ok_or_else(|| {
            DatabaseError::Decode("no landscape layers recorded".to_string())
        })?;
        let recorded = query.get_recorded_timesteps(params.species)?;
        if recorded.is_empty() {
            return Err(ModelError::UnknownSpecies(params.species));
        }

        let run = query.get_run_metadata()?;
        let name = match &run {
            Some(meta) => format!("{}_spp{}", meta.name, params.species),
            None => format!("spp{}", params.species),
        };
        let burn_in_steps = run.as_ref().and_then(|meta| meta.burn_in_steps);
        let burn_in_complete = query.burn_in_complete()?;

        info!(
            database = %params.database.display(),
            species = params.species,
            snapshots = recorded.len(),
            "opened recorded model"
        );

        let species = Species::new(name.clone(), 0, Vec::new())?;
        Ok(Self {
            query,
            species_id: params.species,
            name,
            landscape,
            recorded,
            burn_in_complete,
            burn_in_steps,
            burned_in: false,
            timestep: 0,
            species,
        })
    }

    /// Recorded timesteps of the focal species.
    pub fn recorded_timesteps(&self) -> &[usize] {
        &self.recorded
    }

    fn load(&mut self, recorded_step: usize) -> Result<(), ModelError> {
        if self.burned_in && self.species.timestep() == recorded_step {
            return Ok(());
        }
        let rows = self.query.get_timestep(self.species_id, recorded_step)?;
        let individuals = rows
            .into_iter()
            .map(|row| row.into_individual())
            .collect::<Result<Vec<_>, _>>()?;
        self.species = Species::new(self.name.clone(), recorded_step, individuals)?;
        debug!(
            timestep = recorded_step,
            individuals = self.species.size(),
            "loaded snapshot"
        );
        Ok(())
    }
}

impl Model for RecordedModel {
    fn walk(&mut self, steps: usize, mode: WalkMode) -> Result<(), ModelError> {
        match mode {
            WalkMode::Burn => {
                if !self.burn_in_complete {
                    return Err(ModelError::BurnInUnavailable);
                }
                if let Some(recorded) = self.burn_in_steps
                    && steps > recorded
                {
                    warn!(
                        requested = steps,
                        recorded, "burn-in longer than the recorded one; using the recording"
                    );
                }
                if !self.burned_in {
                    let first = self.recorded[0];
                    self.load(first)?;
                    self.burned_in = true;
                    self.timestep = first;
                }
                info!(steps, timestep = self.timestep, "burn-in complete");
                Ok(())
            }
            WalkMode::Main => {
                if !self.burned_in {
                    return Err(ModelError::NotBurnedIn);
                }
                let target = self.timestep + steps;
                let last = self.recorded.last().copied();
                if last.is_none_or(|last| target > last) {
                    return Err(ModelError::TimestepUnavailable {
                        requested: target,
                        last,
                    });
                }
                let pos = self.recorded.partition_point(|&t| t <= target);
                let step = self.recorded[pos - 1];
                self.load(step)?;
                self.timestep = target;
                info!(steps, timestep = target, snapshot = step, "walked model");
                Ok(())
            }
        }
    }

    fn timestep(&self) -> usize {
        self.timestep
    }

    fn species(&self) -> &Species {
        &self.species
    }

    fn landscape(&self) -> &Landscape {
        &self.landscape
    }
}
