//! Error taxonomy for cascade estimation

use thiserror::Error;

/// Outcome of a failed estimation call. Exactly one is reported per call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    /// Malformed or out-of-range input. Caller error, never retried.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    /// The solver stopped without satisfying its convergence criterion.
    #[error("solver did not converge after {iterations} iterations: {reason}")]
    NonConvergence { iterations: u64, reason: String },

    /// No events were supplied for the cascade.
    #[error("cascade {cascade_id} has no events")]
    EmptyCascade { cascade_id: String },

    /// Configuration rejected before any cascade was processed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EstimationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EstimationError::InvalidObservation(msg.into())
    }

    /// Whether retrying with a different solver configuration could help
    pub fn is_retryable(&self) -> bool {
        matches!(self, EstimationError::NonConvergence { .. })
    }
}

pub type Result<T> = std::result::Result<T, EstimationError>;
