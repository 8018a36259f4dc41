//! Marked power-law Hawkes kernel
//!
//! # The Model
//! ```text
//! λ(t) = μ + Σ_{t_i < t} κ × m_i^ρ × (t - t_i + c)^-(1+θ)
//! Λ(T) = μT + Σ_i κ × m_i^ρ × (c^-θ - (T - t_i + c)^-θ) / θ
//! ```
//!
//! where:
//! - μ: fixed background intensity
//! - κ: branching intensity
//! - c: time offset keeping the kernel finite at zero elapsed time
//! - θ: decay exponent of the power-law memory
//! - ρ: mark exponent applied to event magnitudes
//!
//! The censored log-likelihood on `[0, T]` is `Σ_j ln λ(t_j) - Λ(T)`.

use cascade_core::{EstimatorConfig, HawkesParameters, Observation};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawKernel {
    pub background_rate: f64,
    pub magnitude_exponent: f64,
}

impl PowerLawKernel {
    pub fn new(background_rate: f64, magnitude_exponent: f64) -> Self {
        Self {
            background_rate,
            magnitude_exponent,
        }
    }

    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self::new(config.background_rate, config.magnitude_exponent)
    }

    fn mark(&self, magnitude: f64) -> f64 {
        magnitude.powf(self.magnitude_exponent)
    }

    /// Intensity at `t`, counting only events strictly before it
    pub fn intensity(&self, obs: &Observation, params: &HawkesParameters, t: f64) -> f64 {
        let excitation: f64 = obs
            .events
            .iter()
            .take_while(|e| e.time < t)
            .map(|e| self.mark(e.magnitude) * (t - e.time + params.c).powf(-(1.0 + params.theta)))
            .sum();
        self.background_rate + params.kappa * excitation
    }

    /// Integral of the intensity over `[0, obs.window]`
    pub fn compensator(&self, obs: &Observation, params: &HawkesParameters) -> f64 {
        let head = params.c.powf(-params.theta);
        let excitation: f64 = obs
            .events
            .iter()
            .map(|e| {
                let tail = (obs.window - e.time + params.c).powf(-params.theta);
                self.mark(e.magnitude) * (head - tail)
            })
            .sum();
        self.background_rate * obs.window + params.kappa * excitation / params.theta
    }

    pub fn log_likelihood(&self, obs: &Observation, params: &HawkesParameters) -> f64 {
        let marks: Vec<f64> = obs.magnitudes().map(|m| self.mark(m)).collect();
        let decay = -(1.0 + params.theta);

        let mut log_intensity = 0.0;
        for (j, event) in obs.events.iter().enumerate() {
            let mut excitation = 0.0;
            for (i, earlier) in obs.events[..j].iter().enumerate() {
                // ties share a timestamp and do not excite each other
                if earlier.time < event.time {
                    excitation += marks[i] * (event.time - earlier.time + params.c).powf(decay);
                }
            }
            log_intensity += (self.background_rate + params.kappa * excitation).ln();
        }

        log_intensity - self.compensator(obs, params)
    }

    /// Log-likelihood with self-excitation switched off
    pub fn background_log_likelihood(&self, obs: &Observation) -> f64 {
        obs.n_obs() as f64 * self.background_rate.ln() - self.background_rate * obs.window
    }

    /// Expected number of direct offspring of the observed events landing in
    /// `(window, window + horizon]`
    pub fn residual_offspring(
        &self,
        obs: &Observation,
        params: &HawkesParameters,
        horizon: f64,
    ) -> f64 {
        let tail: f64 = obs
            .events
            .iter()
            .map(|e| {
                let elapsed = obs.window - e.time + params.c;
                let near = elapsed.powf(-params.theta);
                let far = (elapsed + horizon).powf(-params.theta);
                self.mark(e.magnitude) * (near - far)
            })
            .sum();
        params.kappa * tail / params.theta
    }
}
