use crate::errors::{DatabaseError, SnapshotError};
use crate::genome::{DIPLOID, Genotype, Individual};
use serde::{Deserialize, Serialize};

/// Recording strategy for when to persist simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecordingStrategy {
    /// Record every N timesteps.
    EveryN(usize),

    /// Record at specific timesteps.
    Specific(Vec<usize>),

    /// Record all timesteps.
    All,

    /// No recording.
    None,
}

impl RecordingStrategy {
    /// Check if a timestep should be recorded
    pub fn should_record(&self, timestep: usize) -> bool {
        match self {
            Self::EveryN(n) => *n != 0 && timestep.is_multiple_of(*n),
            Self::Specific(steps) => steps.contains(&timestep),
            Self::All => true,
            Self::None => false,
        }
    }
}

/// Description of a recorded run, stored in the `metadata` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Run name
    pub name: String,
    /// Whether the first recorded timestep follows a completed burn-in
    pub burn_in_complete: bool,
    /// Number of burn-in steps the simulator ran, if known
    pub burn_in_steps: Option<usize>,
    /// Free-form simulator parameters, kept for provenance
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl RunMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            burn_in_complete: true,
            burn_in_steps: None,
            parameters: serde_json::Value::Null,
        }
    }
}

/// Row of the `individuals` table as stored on disk.
///
/// Every column except the id is nullable: simulators may skip fields, and
/// the analysis must report such records instead of guessing values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndividualSnapshot {
    pub id: u64,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub genotype: Option<Vec<u8>>, // locus-major alleles
    pub env: Option<Vec<u8>>,      // f64 LE
    pub phenotype: Option<Vec<u8>>, // f64 LE
}

impl IndividualSnapshot {
    /// Create a snapshot row from an individual.
    pub fn from_individual(ind: &Individual) -> Self {
        Self {
            id: ind.id(),
            x: Some(ind.x()),
            y: Some(ind.y()),
            genotype: Some(ind.genotype().as_slice().to_vec()),
            env: Some(encode_f64s(ind.env())),
            phenotype: Some(encode_f64s(ind.phenotype())),
        }
    }

    /// Rebuild the individual, reporting any missing column.
    pub fn into_individual(self) -> Result<Individual, SnapshotError> {
        let id = self.id;
        let missing = |field: &str| SnapshotError::Malformed {
            id,
            reason: format!("missing {field}"),
        };
        let undecodable = |field: &str, e: DatabaseError| SnapshotError::Malformed {
            id,
            reason: format!("unreadable {field}: {e}"),
        };

        let x = self.x.ok_or_else(|| missing("x coordinate"))?;
        let y = self.y.ok_or_else(|| missing("y coordinate"))?;
        let alleles = self.genotype.ok_or_else(|| missing("genotype"))?;
        let genotype = Genotype::from_flat(alleles, DIPLOID)?;
        let env_blob = self.env.ok_or_else(|| missing("environment values"))?;
        let env = decode_f64s(&env_blob).map_err(|e| undecodable("environment values", e))?;
        let phenotype = match self.phenotype {
            Some(blob) => decode_f64s(&blob).map_err(|e| undecodable("phenotype", e))?,
            None => Vec::new(),
        };

        Ok(Individual::new(id, genotype, (x, y), env).with_phenotype(phenotype))
    }
}

/// Encode floats as a little-endian blob.
pub fn encode_f64s(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode a little-endian float blob.
pub fn decode_f64s(bytes: &[u8]) -> Result<Vec<f64>, DatabaseError> {
    if !bytes.len().is_multiple_of(8) {
        return Err(DatabaseError::Decode(format!(
            "blob of {} bytes is not a whole number of f64 values",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(8)
        .map(|chunk| {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect())
}
