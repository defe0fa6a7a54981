//! Population snapshots.
//!
//! A [`Species`] is the state of one simulated species at one timestep: a
//! mapping from individual id to individual record. Iteration always follows
//! ascending id order, which fixes the row order of every matrix derived
//! from a snapshot.

use crate::errors::SnapshotError;
use crate::genome::Individual;
use rand::Rng;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable snapshot of one species.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    /// Species name
    name: Arc<str>,
    /// Timestep at which the snapshot was captured
    timestep: usize,
    individuals: BTreeMap<u64, Individual>,
}

impl Species {
    /// Create a snapshot from individual records.
    ///
    /// Fails with [`SnapshotError::DuplicateId`] if two records share an id.
    pub fn new(
        name: impl Into<Arc<str>>,
        timestep: usize,
        individuals: Vec<Individual>,
    ) -> Result<Self, SnapshotError> {
        let mut map = BTreeMap::new();
        for ind in individuals {
            let id = ind.id();
            if map.insert(id, ind).is_some() {
                return Err(SnapshotError::DuplicateId(id));
            }
        }
        Ok(Self {
            name: name.into(),
            timestep,
            individuals: map,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestep(&self) -> usize {
        self.timestep
    }

    /// Number of individuals in the snapshot.
    pub fn size(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Look up an individual by id.
    pub fn get(&self, id: u64) -> Option<&Individual> {
        self.individuals.get(&id)
    }

    /// Iterate over individuals in ascending id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Individual> {
        self.individuals.values()
    }

    /// Individual ids in ascending order.
    pub fn ids(&self) -> Vec<u64> {
        self.individuals.keys().copied().collect()
    }

    /// Snapshot restricted to the given ids. Unknown ids are ignored.
    pub fn subset(&self, ids: &[u64]) -> Self {
        let individuals = ids
            .iter()
            .filter_map(|id| self.individuals.get(id).map(|ind| (*id, ind.clone())))
            .collect();
        Self {
            name: self.name.clone(),
            timestep: self.timestep,
            individuals,
        }
    }

    /// Draw `n` distinct individuals uniformly at random.
    ///
    /// Returns the whole snapshot when `n` is not smaller than its size.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, n: usize) -> Self {
        if n >= self.size() {
            return self.clone();
        }
        let ids = self.ids();
        let mut picked: Vec<u64> = rand::seq::index::sample(rng, ids.len(), n)
            .into_iter()
            .map(|pos| ids[pos])
            .collect();
        picked.sort_unstable();
        self.subset(&picked)
    }
}
