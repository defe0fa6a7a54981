use landgen_sim::errors::SnapshotError;
use thiserror::Error;

/// Error type for analysis operations.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Malformed snapshot: individual {id}: {reason}")]
    MalformedSnapshot { id: u64, reason: String },
    #[error("Distance count mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Non-zero self distance {value} for individual at row {index}")]
    NonZeroDiagonal { index: usize, value: f64 },
    #[error("Degenerate distances: {0}")]
    DegenerateDistances(String),
    #[error("Scaled value {value} at position {index} lies outside [0, 1]")]
    OutOfUnitRange { index: usize, value: f64 },
    #[error("PCA failed: {0}")]
    Pca(String),
    #[error("Coefficient '{name}' not significant: p = {p_value:.3e} (threshold {alpha})")]
    NotSignificant {
        name: String,
        p_value: f64,
        alpha: f64,
    },
    #[error(transparent)]
    Snapshot(SnapshotError),
    #[error(transparent)]
    Regression(#[from] RegressionError),
}

impl From<SnapshotError> for AnalysisError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::Malformed { id, reason } => Self::MalformedSnapshot { id, reason },
            SnapshotError::DuplicateId(id) => Self::MalformedSnapshot {
                id,
                reason: "duplicate id in snapshot".to_string(),
            },
            other => Self::Snapshot(other),
        }
    }
}

/// Error type for regression fitting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("No observations to fit")]
    Empty,
    #[error("Length mismatch: {endog} outcomes but {exog} design rows")]
    LengthMismatch { endog: usize, exog: usize },
    #[error("Outcome {value} at observation {index} lies outside [0, 1]")]
    OutcomeOutOfRange { index: usize, value: f64 },
    #[error("Outcome is constant ({0}); the logit model has no finite estimate")]
    ConstantOutcome(f64),
    #[error("Hessian is singular at iteration {iteration}")]
    Singular { iteration: usize },
    #[error("Failed to converge after {iterations} iterations (last step {last_step:.3e})")]
    NotConverged { iterations: usize, last_step: f64 },
}
