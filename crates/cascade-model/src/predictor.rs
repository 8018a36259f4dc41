//! Extrapolate the eventual size of a censored cascade
//!
//! Every future event is either a direct offspring of an observed event
//! (landing after the window) or an exogenous arrival within the look-ahead.
//! Each of those starts its own family of descendants whose expected size is
//! governed by the branching ratio `n* = κ × E[m^ρ] × c^-θ / θ`, where
//! `E[m^ρ]` comes from the Pareto magnitude law `(shape, scale)`.
//!
//! Both sources are counted over the look-ahead only. A fit at or above
//! `1 - BORDERLINE_MARGIN` is propagated as if its ratio were exactly that
//! value, for at most `max_generations` generations, so the estimate stays
//! below [`worst_case_total`] whatever the fitted parameters.

use crate::kernel::PowerLawKernel;
use cascade_core::{
    EstimationError, EstimatorConfig, HawkesParameters, Observation, PredictionResult, Result,
};
use tracing::debug;

/// Branching ratios at or above `1 - BORDERLINE_MARGIN` use the generation clamp
pub const BORDERLINE_MARGIN: f64 = 0.01;

/// Largest branching ratio ever propagated into the future
pub const MAX_EFFECTIVE_RATIO: f64 = 1.0 - BORDERLINE_MARGIN;

/// Pluggable extrapolation strategy
pub trait Predictor: Send + Sync {
    fn predict(
        &self,
        params: &HawkesParameters,
        obs: &Observation,
        config: &EstimatorConfig,
    ) -> Result<PredictionResult>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BranchingPredictor;

impl BranchingPredictor {
    pub fn new() -> Self {
        Self
    }
}

/// Expected direct offspring per event
pub fn branching_ratio(params: &HawkesParameters, config: &EstimatorConfig) -> f64 {
    if params.kappa == 0.0 {
        return 0.0;
    }
    match config.prior.magnitude_moment(config.magnitude_exponent) {
        Some(mark) => params.kappa * mark * params.c.powf(-params.theta) / params.theta,
        None => f64::INFINITY,
    }
}

/// Expected family size (the root included) of one event.
///
/// Returns the multiplier and whether the generation clamp was applied. The
/// clamped multiplier sums `MAX_EFFECTIVE_RATIO^g` for `g = 0..=max_generations`
/// and does not depend on how far past criticality `n_star` is.
pub fn family_size(n_star: f64, max_generations: u32) -> (f64, bool) {
    if n_star < MAX_EFFECTIVE_RATIO {
        return (1.0 / (1.0 - n_star), false);
    }
    let r = MAX_EFFECTIVE_RATIO;
    let truncated = (1.0 - r.powi(max_generations as i32 + 1)) / (1.0 - r);
    (truncated, true)
}

/// Upper bound on `expected_total` for `obs` under any kernel parameters
pub fn worst_case_total(obs: &Observation, config: &EstimatorConfig) -> Option<f64> {
    let moment = config.prior.magnitude_moment(config.magnitude_exponent)?;
    let marks: f64 = obs.magnitudes().map(|m| m.powf(config.magnitude_exponent)).sum();
    let roots = MAX_EFFECTIVE_RATIO * marks / moment
        + config.background_rate * config.horizon.lookahead_secs;
    Some(obs.n_obs() as f64 + roots / (1.0 - MAX_EFFECTIVE_RATIO))
}

impl Predictor for BranchingPredictor {
    fn predict(
        &self,
        params: &HawkesParameters,
        obs: &Observation,
        config: &EstimatorConfig,
    ) -> Result<PredictionResult> {
        let kernel = PowerLawKernel::from_config(config);
        let n_obs = obs.n_obs();

        let lookahead = config.horizon.lookahead_secs;

        let n_star = branching_ratio(params, config);
        if !n_star.is_finite() {
            return Err(EstimationError::NonConvergence {
                iterations: 0,
                reason: format!("branching ratio is not finite ({})", n_star),
            });
        }
        let (multiplier, clamped) = family_size(n_star, config.horizon.max_generations);

        let mut direct = if params.kappa == 0.0 {
            0.0
        } else {
            kernel.residual_offspring(obs, params, lookahead)
        };
        if clamped {
            // propagate the observed events at the capped ratio
            direct *= MAX_EFFECTIVE_RATIO / n_star;
        }
        let exogenous = config.background_rate * lookahead;

        let expected_total = n_obs as f64 + (direct + exogenous) * multiplier;
        let rounded = expected_total.round();
        if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
            return Err(EstimationError::NonConvergence {
                iterations: 0,
                reason: format!(
                    "predicted total {} is out of range (branching ratio {})",
                    expected_total, n_star
                ),
            });
        }

        let predicted_additional_events = rounded as i64 - n_obs as i64;

        debug!(
            cascade = %obs.cascade_id,
            n_star,
            clamped,
            expected_total,
            "cascade size predicted"
        );

        Ok(PredictionResult {
            expected_total,
            predicted_additional_events,
            branching_ratio: n_star,
            clamped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{Event, DEFAULT_MAX_GENERATIONS};

    fn sample_obs() -> Observation {
        Observation::new(
            "c",
            20.0,
            vec![
                Event::new(0.0, 1.0),
                Event::new(5.0, 2.0),
                Event::new(12.0, 1.5),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_family_size_subcritical_closed_form() {
        let (size, clamped) = family_size(0.5, DEFAULT_MAX_GENERATIONS);
        assert_eq!(size, 2.0);
        assert!(!clamped);
        assert_eq!(family_size(0.0, DEFAULT_MAX_GENERATIONS), (1.0, false));
    }

    #[test]
    fn test_family_size_supercritical_is_clamped() {
        let (size, clamped) = family_size(2.0, 3);
        assert!(clamped);
        let r = MAX_EFFECTIVE_RATIO;
        assert!((size - (1.0 + r + r * r + r * r * r)).abs() < 1e-12);

        // how far past criticality the fit lands does not matter
        let (at_one, _) = family_size(1.0, DEFAULT_MAX_GENERATIONS);
        let (far_above, _) = family_size(4.66, DEFAULT_MAX_GENERATIONS);
        assert_eq!(at_one, far_above);
        assert!(at_one < (DEFAULT_MAX_GENERATIONS + 1) as f64);
        assert!(at_one < 1.0 / BORDERLINE_MARGIN);
    }

    #[test]
    fn test_borderline_uses_clamp() {
        let (_, clamped) = family_size(1.0 - BORDERLINE_MARGIN / 2.0, DEFAULT_MAX_GENERATIONS);
        assert!(clamped);
    }

    #[test]
    fn test_branching_ratio() {
        let config = EstimatorConfig::default();
        let params = HawkesParameters::new(0.1, 1.0, 0.5);
        let mark = config.prior.magnitude_moment(0.5).unwrap();
        assert!((branching_ratio(&params, &config) - 0.1 * mark / 0.5).abs() < 1e-12);
        assert_eq!(
            branching_ratio(&HawkesParameters::new(0.0, 1.0, 0.5), &config),
            0.0
        );
    }

    #[test]
    fn test_background_only_prediction() {
        let config = EstimatorConfig::default();
        let obs = Observation::degenerate("empty", 10.0).unwrap();
        let params = HawkesParameters::new(0.0, 1.0, config.prior.mode());
        let prediction = BranchingPredictor::new()
            .predict(&params, &obs, &config)
            .unwrap();

        let expected = config.background_rate * config.horizon.lookahead_secs;
        assert!((prediction.expected_total - expected).abs() < 1e-12);
        assert_eq!(prediction.predicted_additional_events, expected.round() as i64);
        assert!(!prediction.clamped);
    }

    #[test]
    fn test_supercritical_prediction_stays_under_clamp_ceiling() {
        let config = EstimatorConfig::default();
        let obs = sample_obs();
        let moment = config.prior.magnitude_moment(config.magnitude_exponent).unwrap();
        let marks: f64 = obs.magnitudes().map(f64::sqrt).sum();
        let (clamped_size, _) = family_size(1.0, config.horizon.max_generations);
        let ceiling = obs.n_obs() as f64
            + (MAX_EFFECTIVE_RATIO * marks / moment
                + config.background_rate * config.horizon.lookahead_secs)
                * clamped_size;

        // κ = 1e4 with c ≈ 32.6 and θ ≈ 2.41 puts n* near 4.7
        for params in [
            HawkesParameters::new(0.3, 1.0, 1.0),
            HawkesParameters::new(1e4, 32.56, 2.41),
            HawkesParameters::new(1e6, 1.0, 0.05),
        ] {
            let n_star = branching_ratio(&params, &config);
            assert!(n_star > 1.0);

            let prediction = BranchingPredictor::new()
                .predict(&params, &obs, &config)
                .unwrap();
            assert!(prediction.clamped);
            assert_eq!(prediction.branching_ratio, n_star);
            assert!(
                prediction.expected_total <= ceiling + 1e-9,
                "n* = {}: {} > {}",
                n_star,
                prediction.expected_total,
                ceiling
            );
            assert!(prediction.predicted_additional_events > 0);
            assert!(prediction.expected_total <= worst_case_total(&obs, &config).unwrap());
        }
    }

    #[test]
    fn test_prediction_grows_with_lookahead() {
        let mut config = EstimatorConfig::default();
        let params = HawkesParameters::new(0.01, 1.0, 0.5);
        let short = BranchingPredictor::new()
            .predict(&params, &sample_obs(), &config)
            .unwrap();

        config.horizon.lookahead_secs *= 10.0;
        let long = BranchingPredictor::new()
            .predict(&params, &sample_obs(), &config)
            .unwrap();
        assert!(long.expected_total > short.expected_total);
        assert!(!long.clamped);
    }

    #[test]
    fn test_out_of_range_total_is_an_error() {
        let config = EstimatorConfig::default().with_background_rate(1e15);
        let obs = Observation::degenerate("huge", 10.0).unwrap();
        let params = HawkesParameters::new(0.0, 1.0, config.prior.mode());

        // 1e15 × 86400 exogenous arrivals do not fit in an i64
        let err = BranchingPredictor::new()
            .predict(&params, &obs, &config)
            .unwrap_err();
        assert!(matches!(err, EstimationError::NonConvergence { .. }));
    }

    #[test]
    fn test_prediction_counts_observed_events() {
        let config = EstimatorConfig::default();
        let params = HawkesParameters::new(0.01, 1.0, 1.0);
        let prediction = BranchingPredictor::new()
            .predict(&params, &sample_obs(), &config)
            .unwrap();
        assert!(prediction.expected_total >= 3.0);
        assert_eq!(
            prediction.predicted_additional_events,
            prediction.expected_total.round() as i64 - 3
        );
    }
}
