//! Core data model, configuration and normalization for cascade estimation

mod config;
mod error;
mod normalizer;
mod types;

pub use config::{
    EstimatorConfig, PredictionHorizon, SolverConfig, DEFAULT_LOOKAHEAD_SECS,
    DEFAULT_MAX_GENERATIONS,
};
pub use error::{EstimationError, Result};
pub use normalizer::normalize;
pub use types::{Event, FitResult, HawkesParameters, Observation, PredictionResult, Prior};
