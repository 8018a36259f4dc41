mod common;

use cascade_core::{EstimationError, Event, Observation};
use common::{bursty_cascade, scenario_config, service, SCENARIO_EVENTS, SCENARIO_WINDOW};

#[test]
fn test_estimate_is_deterministic() {
    let service = service();
    let first = service.estimate("c", &bursty_cascade(), 120.0).unwrap();
    let second = service.estimate("c", &bursty_cascade(), 120.0).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_independent_services_agree() {
    let a = service().estimate("c", &SCENARIO_EVENTS, SCENARIO_WINDOW).unwrap();
    let b = service().estimate("c", &SCENARIO_EVENTS, SCENARIO_WINDOW).unwrap();
    assert_eq!(a.fit, b.fit);
    assert_eq!(a.prediction, b.prediction);
}

#[test]
fn test_growing_window_never_loses_events() {
    let raw = bursty_cascade();
    let full = cascade_core::normalize("c", &raw, 200.0).unwrap();

    let mut previous = 0;
    for window in [1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 100.0, 200.0] {
        let censored = full.censor(window).unwrap();
        assert!(censored.n_obs() >= previous, "window {} lost events", window);
        previous = censored.n_obs();

        let estimate = service().estimate_observation(&censored).unwrap();
        assert_eq!(estimate.n_obs, censored.n_obs());
    }
    assert_eq!(previous, raw.len());
}

#[test]
fn test_degenerate_cascade_uses_prior_mode() {
    let config = scenario_config();
    let obs = Observation::degenerate("quiet", 30.0).unwrap();
    let estimate = service().estimate_observation(&obs).unwrap();

    assert_eq!(estimate.n_obs, 0);
    assert_eq!(estimate.fit.parameters.kappa, 0.0);
    assert!((estimate.fit.parameters.theta - config.prior.mode()).abs() < 1e-9);

    let background = config.background_rate * config.horizon.lookahead_secs;
    assert_eq!(
        estimate.prediction.predicted_additional_events,
        background.round() as i64
    );
    assert_eq!(estimate.prediction.branching_ratio, 0.0);
}

#[test]
fn test_single_event_cascade() {
    let estimate = service().estimate("one", &[(42.0, 3.0)], 60.0).unwrap();
    assert_eq!(estimate.n_obs, 1);
    assert!(estimate.fit.log_likelihood.is_finite());
    assert!(estimate.prediction.expected_total >= 1.0);
}

#[test]
fn test_non_positive_window_is_invalid() {
    for window in [0.0, -5.0] {
        let err = service().estimate("c", &SCENARIO_EVENTS, window).unwrap_err();
        assert!(matches!(err, EstimationError::InvalidObservation(_)));
    }
}

#[test]
fn test_non_positive_magnitude_is_invalid() {
    let err = service()
        .estimate("c", &[(0.0, 1.0), (3.0, 0.0)], 10.0)
        .unwrap_err();
    assert!(matches!(err, EstimationError::InvalidObservation(_)));

    let obs = Observation {
        cascade_id: "direct".to_string(),
        window: 10.0,
        events: vec![Event::new(0.0, -1.0)],
    };
    let err = service().estimate_observation(&obs).unwrap_err();
    assert!(matches!(err, EstimationError::InvalidObservation(_)));
}

#[test]
fn test_unsorted_events_are_invalid() {
    let err = service()
        .estimate("c", &[(0.0, 1.0), (8.0, 1.0), (3.0, 1.0)], 10.0)
        .unwrap_err();
    assert!(matches!(err, EstimationError::InvalidObservation(_)));
}

#[test]
fn test_empty_cascade() {
    let err = service().estimate("nothing", &[], 10.0).unwrap_err();
    assert_eq!(
        err,
        EstimationError::EmptyCascade {
            cascade_id: "nothing".to_string()
        }
    );
}

#[test]
fn test_exhausted_budget_is_non_convergence() {
    let mut config = scenario_config();
    config.solver.max_iters = 3;
    let service = cascade_model::CascadeEstimationService::new(config).unwrap();
    let err = service
        .estimate("c", &SCENARIO_EVENTS, SCENARIO_WINDOW)
        .unwrap_err();
    assert!(err.is_retryable());
}

#[test]
fn test_concurrent_estimates_for_different_cascades() {
    let service = service();
    let cascades: Vec<Vec<(f64, f64)>> = (0..4)
        .map(|k| {
            bursty_cascade()
                .into_iter()
                .map(|(t, m)| (t, m + k as f64))
                .collect()
        })
        .collect();

    let sequential: Vec<_> = cascades
        .iter()
        .map(|raw| service.estimate("c", raw, 120.0).unwrap())
        .collect();

    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = cascades
            .iter()
            .map(|raw| {
                let service = &service;
                scope.spawn(move || service.estimate("c", raw, 120.0).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, concurrent);
}
