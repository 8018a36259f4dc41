//! MAP estimation of power-law Hawkes parameters
//!
//! The objective is `log L(obs | κ, c, θ) + log p(θ) + log p(n*)`, with both
//! priors driven by the same `(shape, scale)` pair. It is maximized with
//! argmin's Nelder-Mead over `(ln n*, ln c, ln θ)`, which keeps every
//! parameter positive; κ follows from `κ = n* θ c^θ / E[m^ρ]`. Searching over
//! the branching ratio instead of κ puts the box on the quantity the prior
//! constrains, so κ is free to take whatever scale `c^θ` calls for. Points
//! outside the box are evaluated at the nearest box point plus a quadratic
//! penalty, so the simplex is pulled back instead of wandering off.

use crate::kernel::PowerLawKernel;
use argmin::core::{CostFunction, Error, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use cascade_core::{
    EstimationError, EstimatorConfig, FitResult, HawkesParameters, Observation, Prior, Result,
};
use tracing::debug;

/// Lower bound on the decay offset c; the kernel is singular at `c = 0`
pub const C_MIN: f64 = 1e-3;
const C_MAX: f64 = 1e5;
const N_STAR_MIN: f64 = 1e-6;
const N_STAR_MAX: f64 = 1e2;
const THETA_MIN: f64 = 1e-3;
const THETA_MAX: f64 = 50.0;

const PENALTY_WEIGHT: f64 = 1e3;
const INFEASIBLE_COST: f64 = 1e100;
/// Size of the initial simplex edges, in log-parameter units
const INITIAL_STEP: f64 = 1.0;

/// Pluggable fitting strategy
pub trait Estimator: Send + Sync {
    fn fit(&self, obs: &Observation, config: &EstimatorConfig) -> Result<FitResult>;
}

/// Maximum-a-posteriori fit with a Nelder-Mead solver
#[derive(Debug, Clone, Copy, Default)]
pub struct MapEstimator;

impl MapEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Fit with self-excitation switched off and θ at the prior mode
    pub fn degenerate_fit(obs: &Observation, config: &EstimatorConfig) -> FitResult {
        let kernel = PowerLawKernel::from_config(config);
        let theta = config.prior.mode();
        let log_likelihood = kernel.background_log_likelihood(obs);
        FitResult {
            log_likelihood,
            log_posterior: log_likelihood
                + config.prior.log_density(theta)
                + config.prior.branching_log_density(0.0),
            parameters: HawkesParameters::new(0.0, config.solver.initial_c, theta),
            iterations: 0,
        }
    }
}

impl Estimator for MapEstimator {
    fn fit(&self, obs: &Observation, config: &EstimatorConfig) -> Result<FitResult> {
        obs.validate()?;

        if obs.is_empty() {
            debug!(cascade = %obs.cascade_id, "no events, falling back to prior mode");
            return Ok(Self::degenerate_fit(obs, config));
        }

        let mark_moment = config
            .prior
            .magnitude_moment(config.magnitude_exponent)
            .ok_or_else(|| {
                EstimationError::InvalidConfig(format!(
                    "magnitude exponent {} has no finite moment under the prior",
                    config.magnitude_exponent
                ))
            })?;

        let objective = MapObjective {
            obs: obs.clone(),
            kernel: PowerLawKernel::from_config(config),
            prior: config.prior,
            mark_moment,
        };

        let start = clamp_to_box(&[
            config.solver.initial_branching_ratio.ln(),
            config.solver.initial_c.ln(),
            config.prior.mode().ln(),
        ]);
        let simplex = initial_simplex(&start);

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(config.solver.sd_tolerance)
            .map_err(|e| EstimationError::InvalidConfig(e.to_string()))?;

        let max_iters = config.solver.max_iters;
        let result = Executor::new(objective, solver)
            .configure(|state| state.max_iters(max_iters))
            .run()
            .map_err(|e| EstimationError::NonConvergence {
                iterations: 0,
                reason: e.to_string(),
            })?;

        let state = result.state();
        let iterations = state.get_iter();

        if let TerminationStatus::Terminated(TerminationReason::MaxItersReached) =
            state.get_termination_status()
        {
            return Err(EstimationError::NonConvergence {
                iterations,
                reason: "iteration budget exhausted".to_string(),
            });
        }

        let best = state
            .get_best_param()
            .ok_or_else(|| EstimationError::NonConvergence {
                iterations,
                reason: "solver returned no parameters".to_string(),
            })?;
        let inside = clamp_to_box(best);
        let n_star = inside[0].exp();
        let parameters = to_parameters(&inside, mark_moment);

        let kernel = PowerLawKernel::from_config(config);
        let log_likelihood = kernel.log_likelihood(obs, &parameters);
        let log_posterior = log_likelihood
            + config.prior.log_density(parameters.theta)
            + config.prior.branching_log_density(n_star);

        if !parameters.is_finite() || !log_posterior.is_finite() {
            return Err(EstimationError::NonConvergence {
                iterations,
                reason: "optimum is not finite".to_string(),
            });
        }

        debug!(
            cascade = %obs.cascade_id,
            iterations,
            kappa = parameters.kappa,
            n_star,
            c = parameters.c,
            theta = parameters.theta,
            log_likelihood,
            "MAP fit converged"
        );

        Ok(FitResult {
            log_likelihood,
            log_posterior,
            parameters,
            iterations,
        })
    }
}

/// Negated MAP objective over log-parameters
struct MapObjective {
    obs: Observation,
    kernel: PowerLawKernel,
    prior: Prior,
    /// `E[m^ρ]`, linking κ to the branching ratio
    mark_moment: f64,
}

impl CostFunction for MapObjective {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, Error> {
        let inside = clamp_to_box(x);
        let penalty: f64 = x
            .iter()
            .zip(&inside)
            .map(|(raw, clamped)| (raw - clamped).powi(2))
            .sum::<f64>()
            * PENALTY_WEIGHT;

        let params = to_parameters(&inside, self.mark_moment);
        let objective = self.kernel.log_likelihood(&self.obs, &params)
            + self.prior.log_density(params.theta)
            + self.prior.branching_log_density(inside[0].exp());

        let cost = -objective + penalty;
        Ok(if cost.is_finite() { cost } else { INFEASIBLE_COST })
    }
}

fn log_bounds() -> [(f64, f64); 3] {
    [
        (N_STAR_MIN.ln(), N_STAR_MAX.ln()),
        (C_MIN.ln(), C_MAX.ln()),
        (THETA_MIN.ln(), THETA_MAX.ln()),
    ]
}

fn clamp_to_box(x: &[f64]) -> Vec<f64> {
    x.iter()
        .zip(log_bounds())
        .map(|(&v, (lo, hi))| if v.is_nan() { lo } else { v.clamp(lo, hi) })
        .collect()
}

fn initial_simplex(start: &[f64]) -> Vec<Vec<f64>> {
    let mut simplex = vec![start.to_vec()];
    for k in 0..start.len() {
        let mut vertex = start.to_vec();
        // step inward when the start sits on the upper edge of the box
        let (_, hi) = log_bounds()[k];
        vertex[k] = if vertex[k] + INITIAL_STEP <= hi {
            vertex[k] + INITIAL_STEP
        } else {
            vertex[k] - INITIAL_STEP
        };
        simplex.push(vertex);
    }
    simplex
}

/// Map `(ln n*, ln c, ln θ)` to kernel parameters
fn to_parameters(x: &[f64], mark_moment: f64) -> HawkesParameters {
    let (c, theta) = (x[1].exp(), x[2].exp());
    let kappa = (x[0] + x[2] + theta * x[1] - mark_moment.ln()).exp();
    HawkesParameters::new(kappa, c, theta)
}
