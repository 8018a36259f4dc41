use cascade_core::EstimatorConfig;

/// Version line plus the model defaults a run uses when no flag overrides them
fn describe(config: &EstimatorConfig) -> String {
    format!(
        "cascade {}\nprior (shape {}, scale {}), background rate {}/s, \
         look-ahead {} s, at most {} generations",
        env!("CARGO_PKG_VERSION"),
        config.prior.shape,
        config.prior.scale,
        config.background_rate,
        config.horizon.lookahead_secs,
        config.horizon.max_generations,
    )
}

pub fn run() -> anyhow::Result<()> {
    println!("{}", describe(&EstimatorConfig::default()));
    Ok(())
}
