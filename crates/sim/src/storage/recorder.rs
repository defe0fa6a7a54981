//! Synchronous recorder that persists landscapes and population snapshots.
//!
//! Simulators (or test fixtures) use the recorder to produce the databases
//! that [`crate::simulation::RecordedModel`] replays.

use crate::errors::DatabaseError;
use crate::simulation::{Landscape, Species};
use crate::storage::Database;
use crate::storage::types::{IndividualSnapshot, RecordingStrategy, RunMetadata, encode_f64s};
use rusqlite::params;
use std::path::Path;
use tracing::debug;

/// Statistics about what a recorder has written.
#[derive(Debug, Clone, Default)]
pub struct RecorderStats {
    /// Snapshots written.
    pub snapshots_recorded: usize,
    /// Individual rows written.
    pub individuals_recorded: usize,
    /// Snapshots the recording strategy rejected.
    pub snapshots_skipped: usize,
}

/// Writes a run into a snapshot database.
pub struct Recorder {
    db: Database,
    strategy: RecordingStrategy,
    stats: RecorderStats,
}

impl Recorder {
    /// Create a recorder and write the run metadata.
    pub fn new(
        db_path: impl AsRef<Path>,
        metadata: &RunMetadata,
        strategy: RecordingStrategy,
    ) -> Result<Self, DatabaseError> {
        let mut db = Database::open(db_path)?;

        let full_json =
            serde_json::to_string(metadata).map_err(|e| DatabaseError::Insert(e.to_string()))?;
        let meta_pairs = vec![
            ("name", metadata.name.clone()),
            ("burn_in_complete", metadata.burn_in_complete.to_string()),
            (
                "burn_in_steps",
                metadata
                    .burn_in_steps
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
            ("full_metadata_json", full_json),
        ];

        let tx = db.transaction()?;
        {
            let mut stmt = tx
                .prepare("INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)")
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            for (k, v) in meta_pairs {
                stmt.execute(params![k, v])
                    .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        Ok(Self {
            db,
            strategy,
            stats: RecorderStats::default(),
        })
    }

    /// Whether the configured strategy records this timestep.
    pub fn should_record(&self, timestep: usize) -> bool {
        self.strategy.should_record(timestep)
    }

    /// Write every landscape layer, replacing previously stored layers.
    pub fn record_landscape(&mut self, landscape: &Landscape) -> Result<(), DatabaseError> {
        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM landscape", [])
            .map_err(|e| DatabaseError::Insert(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO landscape (layer_idx, name, rows, cols, raster)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            for (idx, layer) in landscape.layers().iter().enumerate() {
                stmt.execute(params![
                    idx as i64,
                    layer.name(),
                    landscape.rows() as i64,
                    landscape.cols() as i64,
                    encode_f64s(layer.raster()),
                ])
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    /// Write a species snapshot at its own timestep.
    ///
    /// Returns `false` without writing when the strategy skips the timestep.
    pub fn record_species(
        &mut self,
        species_id: usize,
        species: &Species,
    ) -> Result<bool, DatabaseError> {
        if !self.should_record(species.timestep()) {
            self.skip(species_id, species.timestep());
            return Ok(false);
        }
        let rows: Vec<IndividualSnapshot> =
            species.iter().map(IndividualSnapshot::from_individual).collect();
        self.record_rows(species_id, species.timestep(), &rows)
    }

    /// Write raw rows for one timestep. Missing columns are stored as NULL.
    ///
    /// Returns `false` without writing when the strategy skips the timestep.
    pub fn record_rows(
        &mut self,
        species_id: usize,
        timestep: usize,
        rows: &[IndividualSnapshot],
    ) -> Result<bool, DatabaseError> {
        if !self.should_record(timestep) {
            self.skip(species_id, timestep);
            return Ok(false);
        }
        let tx = self.db.transaction()?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO individuals
                     (timestep, species_id, individual_id, x, y, genotype, env, phenotype)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            for row in rows {
                stmt.execute(params![
                    timestep as i64,
                    species_id as i64,
                    row.id as i64,
                    row.x,
                    row.y,
                    row.genotype,
                    row.env,
                    row.phenotype,
                ])
                .map_err(|e| DatabaseError::Insert(e.to_string()))?;
            }
        }
        tx.commit()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;

        self.stats.snapshots_recorded += 1;
        self.stats.individuals_recorded += rows.len();
        debug!(timestep, species_id, individuals = rows.len(), "recorded snapshot");
        Ok(true)
    }

    fn skip(&mut self, species_id: usize, timestep: usize) {
        self.stats.snapshots_skipped += 1;
        debug!(timestep, species_id, strategy = ?self.strategy, "skipped snapshot");
    }

    pub fn stats(&self) -> &RecorderStats {
        &self.stats
    }

    /// Flush and close the underlying database.
    pub fn close(self) -> Result<RecorderStats, DatabaseError> {
        let stats = self.stats;
        self.db.close()?;
        Ok(stats)
    }
}
