//! Core types for cascade estimation

use crate::error::{EstimationError, Result};
use serde::{Deserialize, Serialize};

/// One occurrence in a cascade: when it happened and how much weight it carries.
///
/// Serialized as a `[time, magnitude]` pair to match the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Event {
    pub time: f64,
    pub magnitude: f64,
}

impl Event {
    pub fn new(time: f64, magnitude: f64) -> Self {
        Self { time, magnitude }
    }
}

impl From<(f64, f64)> for Event {
    fn from((time, magnitude): (f64, f64)) -> Self {
        Self { time, magnitude }
    }
}

impl From<Event> for (f64, f64) {
    fn from(event: Event) -> Self {
        (event.time, event.magnitude)
    }
}

/// A cascade censored at `window`: events after it are unobserved, not absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub cascade_id: String,
    pub window: f64,
    pub events: Vec<Event>,
}

impl Observation {
    /// Build and validate an observation whose events are already zero-origin.
    pub fn new(cascade_id: impl Into<String>, window: f64, events: Vec<Event>) -> Result<Self> {
        let obs = Self {
            cascade_id: cascade_id.into(),
            window,
            events,
        };
        obs.validate()?;
        Ok(obs)
    }

    /// Zero-event observation (background rate only)
    pub fn degenerate(cascade_id: impl Into<String>, window: f64) -> Result<Self> {
        Self::new(cascade_id, window, Vec::new())
    }

    pub fn n_obs(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.window.is_finite() || self.window <= 0.0 {
            return Err(EstimationError::invalid(format!(
                "window must be positive and finite, got {}",
                self.window
            )));
        }

        let mut previous = 0.0;
        for (i, event) in self.events.iter().enumerate() {
            if !event.time.is_finite() || event.time < 0.0 {
                return Err(EstimationError::invalid(format!(
                    "event {} has invalid time {}",
                    i, event.time
                )));
            }
            if event.time > self.window {
                return Err(EstimationError::invalid(format!(
                    "event {} at {} lies beyond the window {}",
                    i, event.time, self.window
                )));
            }
            if event.time < previous {
                return Err(EstimationError::invalid(format!(
                    "events are not sorted by time at index {}",
                    i
                )));
            }
            if !event.magnitude.is_finite() || event.magnitude <= 0.0 {
                return Err(EstimationError::invalid(format!(
                    "event {} has non-positive magnitude {}",
                    i, event.magnitude
                )));
            }
            previous = event.time;
        }
        Ok(())
    }

    /// The same cascade observed only up to `window`.
    pub fn censor(&self, window: f64) -> Result<Self> {
        let events = self
            .events
            .iter()
            .copied()
            .filter(|e| e.time <= window)
            .collect();
        Self::new(self.cascade_id.clone(), window, events)
    }

    pub fn magnitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.events.iter().map(|e| e.magnitude)
    }
}

/// Power-law prior hyperparameters, fixed per deployment.
///
/// `shape` and `scale` parameterize both the inverse-gamma prior on the decay
/// exponent θ and the Pareto law of event magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prior {
    pub shape: f64,
    pub scale: f64,
}

impl Prior {
    pub fn new(shape: f64, scale: f64) -> Self {
        Self { shape, scale }
    }

    /// Mode of the prior on θ
    pub fn mode(&self) -> f64 {
        self.scale / (self.shape + 1.0)
    }

    /// Unnormalized log density of θ: `-(shape + 1) ln θ - scale / θ`
    pub fn log_density(&self, theta: f64) -> f64 {
        if theta <= 0.0 {
            return f64::NEG_INFINITY;
        }
        -(self.shape + 1.0) * theta.ln() - self.scale / theta
    }

    /// Unnormalized log density of the branching ratio: `-(shape + 1) ln(1 + n*)`.
    ///
    /// A power-law tail with unit scale. Without it the likelihood of a short
    /// window keeps improving as κ and c grow together along a ridge where
    /// n* grows without bound.
    pub fn branching_log_density(&self, n_star: f64) -> f64 {
        if n_star < 0.0 {
            return f64::NEG_INFINITY;
        }
        -(self.shape + 1.0) * n_star.ln_1p()
    }

    /// `E[m^rho]` under the Pareto magnitude law, `None` when the moment diverges.
    pub fn magnitude_moment(&self, rho: f64) -> Option<f64> {
        let tail = self.shape - 1.0 - rho;
        if tail <= 0.0 {
            return None;
        }
        Some((self.shape - 1.0) / tail * self.scale.powf(rho))
    }
}

impl Default for Prior {
    fn default() -> Self {
        Self::new(2.4, 10.0)
    }
}

/// Fitted kernel parameters. Never mutated after the estimator returns them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HawkesParameters {
    /// Branching intensity κ
    pub kappa: f64,
    /// Time-decay offset c, strictly positive
    pub c: f64,
    /// Decay exponent θ
    pub theta: f64,
}

impl HawkesParameters {
    pub fn new(kappa: f64, c: f64, theta: f64) -> Self {
        Self { kappa, c, theta }
    }

    /// Ordered `[kappa, c, theta]` for export across process boundaries
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.kappa, self.c, self.theta]
    }

    pub fn is_finite(&self) -> bool {
        self.kappa.is_finite() && self.c.is_finite() && self.theta.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Censored data log-likelihood at the fitted parameters
    pub log_likelihood: f64,
    /// Maximized MAP objective (log-likelihood plus unnormalized log prior)
    pub log_posterior: f64,
    pub parameters: HawkesParameters,
    /// Solver iterations spent (0 when no solver ran)
    pub iterations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Expected eventual number of events, observed ones included
    pub expected_total: f64,
    /// `round(expected_total) - n_obs`; negative when the estimate undershoots
    pub predicted_additional_events: i64,
    pub branching_ratio: f64,
    /// Whether the look-ahead clamp replaced the closed form
    pub clamped: bool,
}
