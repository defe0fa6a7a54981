//! Low-level database operations and schema management.

pub use crate::errors::DatabaseError;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use tracing::warn;

/// Database connection wrapper with schema management.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
    db_path: String,
}

impl Database {
    /// Open (or create) a database at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn =
            Connection::open(&path_str).map_err(|e| DatabaseError::Connection(e.to_string()))?;

        conn.execute_batch(
            "PRAGMA synchronous = NORMAL;
             PRAGMA journal_mode = WAL;
             PRAGMA temp_store = MEMORY;
             PRAGMA cache_size = -64000;",
        )
        .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        let mut db = Self {
            conn,
            db_path: path_str,
        };

        db.initialize_schema()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn initialize_schema(&mut self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "-- Metadata table (run description items)
                CREATE TABLE IF NOT EXISTS metadata (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                -- Landscape rasters, ONE ROW PER LAYER
                CREATE TABLE IF NOT EXISTS landscape (
                    layer_idx INTEGER PRIMARY KEY,
                    name TEXT NOT NULL,
                    rows INTEGER NOT NULL,
                    cols INTEGER NOT NULL,
                    raster BLOB NOT NULL -- f64 LE, row-major
                );

                -- Population snapshots, ONE ROW PER INDIVIDUAL
                CREATE TABLE IF NOT EXISTS individuals (
                    timestep INTEGER NOT NULL,
                    species_id INTEGER NOT NULL,
                    individual_id INTEGER NOT NULL,
                    x REAL,
                    y REAL,
                    genotype BLOB,  -- locus-major alleles
                    env BLOB,       -- f64 LE, one per layer
                    phenotype BLOB, -- f64 LE, one per trait
                    PRIMARY KEY (timestep, species_id, individual_id)
                );

                CREATE INDEX IF NOT EXISTS idx_individuals_step
                    ON individuals(species_id, timestep);",
            )
            .map_err(|e| DatabaseError::Initialization(e.to_string()))?;

        Ok(())
    }

    /// Begin a transaction for batched operations.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, DatabaseError> {
        self.conn
            .transaction()
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }

    /// Get reference to underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get database path.
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Close the database and clean up WAL files.
    pub fn close(self) -> Result<(), DatabaseError> {
        if let Err(e) = self.conn.execute_batch(
            "PRAGMA wal_checkpoint(TRUNCATE);
             PRAGMA journal_mode = DELETE;",
        ) {
            warn!(path = %self.db_path, "failed to checkpoint/truncate WAL: {e}");
        }

        self.conn
            .close()
            .map_err(|(_conn, e)| DatabaseError::Close(e.to_string()))?;

        for suffix in &["-wal", "-shm"] {
            let fname = format!("{}{}", self.db_path, suffix);
            if let Err(e) = std::fs::remove_file(&fname)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                warn!("failed to remove {fname}: {e}");
            }
        }

        Ok(())
    }

    /// Get database statistics.
    pub fn stats(&self) -> Result<DatabaseStats, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let mut tables = Vec::new();
        for row in rows {
            tables.push(row.map_err(|e| DatabaseError::Query(e.to_string()))?);
        }

        let individual_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM individuals", [], |row| row.get(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let layer_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM landscape", [], |row| row.get(0))
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        Ok(DatabaseStats {
            individual_records: individual_count as usize,
            landscape_layers: layer_count as usize,
            tables,
        })
    }
}

/// Database statistics.
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub individual_records: usize,
    pub landscape_layers: usize,
    pub tables: Vec<String>,
}
