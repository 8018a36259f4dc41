//! Configuration for cascade estimation

use crate::error::{EstimationError, Result};
use crate::types::Prior;
use serde::{Deserialize, Serialize};

/// Look-ahead over which exogenous arrivals and late offspring are counted (one day)
pub const DEFAULT_LOOKAHEAD_SECS: f64 = 86_400.0;

/// Offspring generations summed when the branching ratio is not safely below one
pub const DEFAULT_MAX_GENERATIONS: u32 = 20;

/// Clamp policy for extrapolating a cascade's future
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionHorizon {
    pub lookahead_secs: f64,
    pub max_generations: u32,
}

impl Default for PredictionHorizon {
    fn default() -> Self {
        Self {
            lookahead_secs: DEFAULT_LOOKAHEAD_SECS,
            max_generations: DEFAULT_MAX_GENERATIONS,
        }
    }
}

/// Nelder-Mead budget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_iters: u64,
    /// Stop once the standard deviation of simplex costs falls below this
    pub sd_tolerance: f64,
    /// Starting point for the decay offset c
    pub initial_c: f64,
    /// Starting point for the branching ratio n*
    pub initial_branching_ratio: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iters: 5000,
            sd_tolerance: 1e-10,
            initial_c: 1.0,
            initial_branching_ratio: 0.5,
        }
    }
}

/// Process-wide estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Fixed exogenous intensity μ (events per second)
    pub background_rate: f64,

    pub prior: Prior,

    /// Mark exponent ρ applied to magnitudes in the kernel
    pub magnitude_exponent: f64,

    pub solver: SolverConfig,

    pub horizon: PredictionHorizon,
}

impl EstimatorConfig {
    pub fn new() -> Self {
        Self {
            background_rate: 1e-4,
            prior: Prior::default(),
            magnitude_exponent: 0.5,
            solver: SolverConfig::default(),
            horizon: PredictionHorizon::default(),
        }
    }

    pub fn with_prior(mut self, prior: Prior) -> Self {
        self.prior = prior;
        self
    }

    pub fn with_background_rate(mut self, mu: f64) -> Self {
        self.background_rate = mu;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |value: f64| value.is_finite() && value > 0.0;

        if !positive(self.background_rate) {
            return Err(EstimationError::InvalidConfig(format!(
                "background rate must be positive, got {}",
                self.background_rate
            )));
        }
        if !positive(self.prior.shape) || !positive(self.prior.scale) {
            return Err(EstimationError::InvalidConfig(format!(
                "prior shape and scale must be positive, got ({}, {})",
                self.prior.shape, self.prior.scale
            )));
        }
        if !self.magnitude_exponent.is_finite() || self.magnitude_exponent < 0.0 {
            return Err(EstimationError::InvalidConfig(format!(
                "magnitude exponent must be non-negative, got {}",
                self.magnitude_exponent
            )));
        }
        if self.prior.magnitude_moment(self.magnitude_exponent).is_none() {
            return Err(EstimationError::InvalidConfig(format!(
                "magnitude exponent {} must be below prior shape - 1 ({})",
                self.magnitude_exponent,
                self.prior.shape - 1.0
            )));
        }
        if self.solver.max_iters == 0 || !positive(self.solver.sd_tolerance) {
            return Err(EstimationError::InvalidConfig(
                "solver needs a positive iteration budget and tolerance".to_string(),
            ));
        }
        if !positive(self.solver.initial_c) || !positive(self.solver.initial_branching_ratio) {
            return Err(EstimationError::InvalidConfig(
                "solver starting point must be positive".to_string(),
            ));
        }
        if !self.horizon.lookahead_secs.is_finite() || self.horizon.lookahead_secs < 0.0 {
            return Err(EstimationError::InvalidConfig(format!(
                "look-ahead must be non-negative, got {}",
                self.horizon.lookahead_secs
            )));
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
