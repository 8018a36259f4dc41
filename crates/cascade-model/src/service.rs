//! Per-cascade pipeline: normalize, fit, predict
//!
//! Every call starts from scratch and keeps no state, so one service can be
//! shared across worker threads for different cascades.

use crate::estimator::{Estimator, MapEstimator};
use crate::predictor::{BranchingPredictor, Predictor};
use cascade_core::{
    normalize, EstimationError, EstimatorConfig, FitResult, Observation, PredictionResult, Result,
};
use cascade_records::{CascadeProperties, CascadeSeries};
use tracing::{debug, info, info_span};

/// Fit and prediction for one cascade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub n_obs: usize,
    pub fit: FitResult,
    pub prediction: PredictionResult,
}

pub struct CascadeEstimationService<E = MapEstimator, P = BranchingPredictor> {
    config: EstimatorConfig,
    estimator: E,
    predictor: P,
}

impl CascadeEstimationService {
    pub fn new(config: EstimatorConfig) -> Result<Self> {
        Self::with_strategies(config, MapEstimator::new(), BranchingPredictor::new())
    }
}

impl<E: Estimator, P: Predictor> CascadeEstimationService<E, P> {
    pub fn with_strategies(config: EstimatorConfig, estimator: E, predictor: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            estimator,
            predictor,
        })
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate a cascade from raw `(absolute_time, magnitude)` pairs
    pub fn estimate(&self, cascade_id: &str, raw: &[(f64, f64)], window: f64) -> Result<Estimate> {
        let _span = info_span!("estimate", cascade = %cascade_id).entered();
        debug!(events = raw.len(), window, "received");

        let obs = normalize(cascade_id, raw, window)?;
        debug!(n_obs = obs.n_obs(), "normalized");

        self.run(&obs)
    }

    /// Estimate an already normalized observation, zero-event ones included
    pub fn estimate_observation(&self, obs: &Observation) -> Result<Estimate> {
        let _span = info_span!("estimate", cascade = %obs.cascade_id).entered();
        obs.validate()?;
        self.run(obs)
    }

    fn run(&self, obs: &Observation) -> Result<Estimate> {
        let fit = self.estimator.fit(obs, &self.config)?;
        debug!(log_likelihood = fit.log_likelihood, "fitted");

        let prediction = self.predictor.predict(&fit.parameters, obs, &self.config)?;
        debug!(
            additional = prediction.predicted_additional_events,
            "predicted"
        );

        Ok(Estimate {
            n_obs: obs.n_obs(),
            fit,
            prediction,
        })
    }

    /// Turn one series record into its properties record
    pub fn process(&self, series: &CascadeSeries) -> Result<CascadeProperties> {
        if !series.is_series() {
            return Err(EstimationError::invalid(format!(
                "record {} has type {:?}, expected a cascade series",
                series.cid, series.kind
            )));
        }

        info!(
            cascade = %series.cid,
            window = series.window,
            events = series.tweets.len(),
            "processing cascade"
        );

        let estimate = self.estimate(&series.cid, &series.tweets, series.window)?;

        Ok(CascadeProperties::new(
            series,
            estimate.n_obs,
            estimate.prediction.predicted_additional_events,
            estimate.fit.parameters.to_vec(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{HawkesParameters, Prior};

    struct FixedEstimator;

    impl Estimator for FixedEstimator {
        fn fit(&self, _obs: &Observation, _config: &EstimatorConfig) -> Result<FitResult> {
            Ok(FitResult {
                log_likelihood: -1.0,
                log_posterior: -2.0,
                parameters: HawkesParameters::new(0.0, 1.0, 1.0),
                iterations: 0,
            })
        }
    }

    fn sample_series() -> CascadeSeries {
        let mut series = CascadeSeries::new(
            "tw1",
            20.0,
            vec![(1000.0, 1.0), (1005.0, 2.0), (1012.0, 1.5)],
        );
        series.msg = serde_json::json!("original text");
        series
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EstimatorConfig::new().with_prior(Prior::new(0.0, 10.0));
        assert!(matches!(
            CascadeEstimationService::new(config),
            Err(EstimationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_estimate_empty_cascade() {
        let service = CascadeEstimationService::new(EstimatorConfig::default()).unwrap();
        let err = service.estimate("none", &[], 10.0).unwrap_err();
        assert!(matches!(err, EstimationError::EmptyCascade { .. }));
    }

    #[test]
    fn test_custom_estimator_strategy() {
        let service = CascadeEstimationService::with_strategies(
            EstimatorConfig::default(),
            FixedEstimator,
            BranchingPredictor::new(),
        )
        .unwrap();
        let estimate = service
            .estimate("c", &[(0.0, 1.0), (2.0, 1.0)], 10.0)
            .unwrap();
        assert_eq!(estimate.n_obs, 2);
        assert_eq!(estimate.fit.log_likelihood, -1.0);
        assert!(!estimate.prediction.clamped);
    }

    #[test]
    fn test_process_builds_properties() {
        let service = CascadeEstimationService::new(EstimatorConfig::default()).unwrap();
        let series = sample_series();
        let props = service.process(&series).unwrap();

        assert_eq!(props.kind, "parameters");
        assert_eq!(props.cid, "tw1");
        assert_eq!(props.msg, series.msg);
        assert_eq!(props.n_obs, 3);
        assert_eq!(props.params.len(), 3);
    }

    #[test]
    fn test_process_rejects_other_record_types() {
        let service = CascadeEstimationService::new(EstimatorConfig::default()).unwrap();
        let mut series = sample_series();
        series.kind = "size".to_string();
        assert!(matches!(
            service.process(&series),
            Err(EstimationError::InvalidObservation(_))
        ));
    }

    #[test]
    fn test_service_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CascadeEstimationService>();
    }
}
