use std::error;
use std::fmt;

/// Errors raised while building or validating a population snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// An allele value other than 0 or 1 was found.
    InvalidAllele { locus: usize, allele: u8 },
    /// A flat allele buffer does not divide evenly into the ploidy.
    RaggedGenotype { len: usize, ploidy: usize },
    /// The same individual id appears twice in one snapshot.
    DuplicateId(u64),
    /// A record is missing data required for analysis.
    Malformed { id: u64, reason: String },
    /// A landscape raster does not match the declared grid.
    RasterShape {
        layer: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAllele { locus, allele } => {
                write!(f, "Invalid allele {allele} at locus {locus} (must be 0 or 1)")
            }
            Self::RaggedGenotype { len, ploidy } => {
                write!(f, "Genotype of {len} alleles is not divisible by ploidy {ploidy}")
            }
            Self::DuplicateId(id) => write!(f, "Duplicate individual id {id} in snapshot"),
            Self::Malformed { id, reason } => {
                write!(f, "Malformed record for individual {id}: {reason}")
            }
            Self::RasterShape {
                layer,
                expected,
                actual,
            } => write!(
                f,
                "Raster for layer '{layer}' has {actual} cells, expected {expected}"
            ),
        }
    }
}

impl error::Error for SnapshotError {}

/// Database error types.
#[derive(Debug, Clone)]
pub enum DatabaseError {
    Connection(String),
    Initialization(String),
    Transaction(String),
    Query(String),
    Insert(String),
    Close(String),
    /// A stored blob could not be decoded.
    Decode(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(e) => write!(f, "Database connection error: {e}"),
            Self::Initialization(e) => write!(f, "Database initialization error: {e}"),
            Self::Transaction(e) => write!(f, "Transaction error: {e}"),
            Self::Query(e) => write!(f, "Query error: {e}"),
            Self::Insert(e) => write!(f, "Insert error: {e}"),
            Self::Close(e) => write!(f, "Close error: {e}"),
            Self::Decode(e) => write!(f, "Blob decode error: {e}"),
        }
    }
}

impl error::Error for DatabaseError {}

/// Errors reported by a simulation model while walking or serving snapshots.
#[derive(Debug)]
pub enum ModelError {
    /// The model cannot provide a burned-in state.
    BurnInUnavailable,
    /// A main walk was requested before the burn-in.
    NotBurnedIn,
    /// The requested timestep lies beyond what the model can reach.
    TimestepUnavailable { requested: usize, last: Option<usize> },
    /// The requested species does not exist.
    UnknownSpecies(usize),
    Database(DatabaseError),
    Snapshot(SnapshotError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BurnInUnavailable => write!(f, "Model has no burned-in state to start from"),
            Self::NotBurnedIn => write!(f, "Model must be burned in before the main walk"),
            Self::TimestepUnavailable { requested, last } => match last {
                Some(last) => write!(
                    f,
                    "Timestep {requested} is not available (last recorded timestep is {last})"
                ),
                None => write!(f, "Timestep {requested} is not available (nothing recorded)"),
            },
            Self::UnknownSpecies(idx) => write!(f, "Species {idx} does not exist in this model"),
            Self::Database(e) => write!(f, "{e}"),
            Self::Snapshot(e) => write!(f, "{e}"),
        }
    }
}

impl error::Error for ModelError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Database(e) => Some(e),
            Self::Snapshot(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DatabaseError> for ModelError {
    fn from(e: DatabaseError) -> Self {
        Self::Database(e)
    }
}

impl From<SnapshotError> for ModelError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}
