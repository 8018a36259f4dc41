use crate::cli::ModelArgs;
use cascade_model::CascadeEstimationService;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct FitReport {
    cid: String,
    n_obs: usize,
    log_likelihood: f64,
    log_posterior: f64,
    iterations: u64,
    params: Vec<f64>,
    branching_ratio: f64,
    expected_total: f64,
    n_supp: i64,
    clamped: bool,
}

/// Parse `t:m,t:m,...` into event pairs
fn parse_events(pairs: &str) -> anyhow::Result<Vec<(f64, f64)>> {
    pairs
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> anyhow::Result<(f64, f64)> {
            let (time, magnitude) = pair
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("expected time:magnitude, got {:?}", pair))?;
            Ok((time.trim().parse()?, magnitude.trim().parse()?))
        })
        .collect()
}

pub fn run(events: &str, window: f64, cid: &str, model: &ModelArgs) -> anyhow::Result<()> {
    let raw = parse_events(events)?;
    let service = CascadeEstimationService::new(model.to_config())?;
    let estimate = service.estimate(cid, &raw, window)?;

    let report = FitReport {
        cid: cid.to_string(),
        n_obs: estimate.n_obs,
        log_likelihood: estimate.fit.log_likelihood,
        log_posterior: estimate.fit.log_posterior,
        iterations: estimate.fit.iterations,
        params: estimate.fit.parameters.to_vec(),
        branching_ratio: estimate.prediction.branching_ratio,
        expected_total: estimate.prediction.expected_total,
        n_supp: estimate.prediction.predicted_additional_events,
        clamped: estimate.prediction.clamped,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
