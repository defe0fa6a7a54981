//! Query interface for reading recorded runs.

use crate::errors::DatabaseError;
use crate::simulation::Landscape;
use crate::storage::types::{IndividualSnapshot, RunMetadata, decode_f64s};
use crate::storage::{Database, DatabaseStats};
use rusqlite::{OptionalExtension, params};

/// Query builder for reading snapshot databases.
pub struct QueryBuilder {
    db: Database,
}

impl QueryBuilder {
    /// Open a database for querying.
    pub fn new(db_path: impl AsRef<std::path::Path>) -> Result<Self, DatabaseError> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    /// Get raw metadata value by key.
    pub fn get_metadata_value(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT value FROM metadata WHERE key = ?1")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        stmt.query_row(params![key], |row| row.get(0))
            .optional()
            .map_err(|e| DatabaseError::Query(e.to_string()))
    }

    /// Get the run description written by the recorder, if any.
    pub fn get_run_metadata(&self) -> Result<Option<RunMetadata>, DatabaseError> {
        match self.get_metadata_value("full_metadata_json")? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| DatabaseError::Decode(format!("run metadata: {e}"))),
            None => Ok(None),
        }
    }

    /// Whether the recorded run starts from a burned-in state.
    pub fn burn_in_complete(&self) -> Result<bool, DatabaseError> {
        Ok(self
            .get_metadata_value("burn_in_complete")?
            .is_some_and(|v| v == "true"))
    }

    /// Load the landscape, or `None` when no layer was recorded.
    pub fn get_landscape(&self) -> Result<Option<Landscape>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT name, rows, cols, raster FROM landscape ORDER BY layer_idx")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as usize,
                    row.get::<_, i64>(2)? as usize,
                    row.get::<_, Vec<u8>>(3)?,
                ))
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut landscape: Option<Landscape> = None;
        for row in rows {
            let (name, n_rows, n_cols, raster) =
                row.map_err(|e| DatabaseError::Query(e.to_string()))?;
            let land = landscape.get_or_insert_with(|| Landscape::new(n_rows, n_cols));
            if land.rows() != n_rows || land.cols() != n_cols {
                return Err(DatabaseError::Decode(format!(
                    "layer '{name}' is {n_rows}x{n_cols}, landscape is {}x{}",
                    land.rows(),
                    land.cols()
                )));
            }
            land.add_layer(name, decode_f64s(&raster)?)
                .map_err(|e| DatabaseError::Decode(e.to_string()))?;
        }

        Ok(landscape)
    }

    /// Species ids present in the database.
    pub fn get_species_ids(&self) -> Result<Vec<usize>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT DISTINCT species_id FROM individuals ORDER BY species_id")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| Ok(row.get::<_, i64>(0)? as usize))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }
        Ok(ids)
    }

    /// Get all recorded timesteps of one species, ascending.
    pub fn get_recorded_timesteps(&self, species_id: usize) -> Result<Vec<usize>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT DISTINCT timestep FROM individuals
                 WHERE species_id = ?1 ORDER BY timestep",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![species_id as i64], |row| {
                Ok(row.get::<_, i64>(0)? as usize)
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut steps = Vec::new();
        for row in rows {
            steps.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }
        Ok(steps)
    }

    /// Get the raw rows of one species at one timestep, ordered by id.
    pub fn get_timestep(
        &self,
        species_id: usize,
        timestep: usize,
    ) -> Result<Vec<IndividualSnapshot>, DatabaseError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(
                "SELECT individual_id, x, y, genotype, env, phenotype
                 FROM individuals
                 WHERE species_id = ?1 AND timestep = ?2
                 ORDER BY individual_id",
            )
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![species_id as i64, timestep as i64], |row| {
                Ok(IndividualSnapshot {
                    id: row.get::<_, i64>(0)? as u64,
                    x: row.get(1)?,
                    y: row.get(2)?,
                    genotype: row.get(3)?,
                    env: row.get(4)?,
                    phenotype: row.get(5)?,
                })
            })
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut snapshots = Vec::new();
        for row in rows {
            snapshots.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }
        Ok(snapshots)
    }

    /// Table and row counts of the underlying database.
    pub fn stats(&self) -> Result<DatabaseStats, DatabaseError> {
        self.db.stats()
    }

    /// Close the database connection.
    pub fn close(self) -> Result<(), DatabaseError> {
        self.db.close()
    }
}
