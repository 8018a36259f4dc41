#![allow(dead_code)]

use cascade_core::{EstimatorConfig, Prior};
use cascade_model::CascadeEstimationService;

/// Events of the reference scenario, already zero-origin
pub const SCENARIO_EVENTS: [(f64, f64); 3] = [(0.0, 1.0), (5.0, 2.0), (12.0, 1.5)];
pub const SCENARIO_WINDOW: f64 = 20.0;

pub fn scenario_config() -> EstimatorConfig {
    EstimatorConfig::new().with_prior(Prior::new(2.4, 10.0))
}

pub fn service() -> CascadeEstimationService {
    CascadeEstimationService::new(scenario_config()).unwrap()
}

/// A longer cascade with bursts, in absolute time
pub fn bursty_cascade() -> Vec<(f64, f64)> {
    vec![
        (1_000.0, 3.0),
        (1_001.0, 1.0),
        (1_001.5, 2.0),
        (1_003.0, 1.0),
        (1_010.0, 5.0),
        (1_011.0, 1.0),
        (1_011.2, 1.0),
        (1_020.0, 1.5),
        (1_045.0, 1.0),
        (1_090.0, 2.0),
    ]
}
