use cascade_core::{EstimatorConfig, Prior, DEFAULT_LOOKAHEAD_SECS, DEFAULT_MAX_GENERATIONS};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cascade")]
#[command(version)]
#[command(about = "Hawkes-process estimation and size prediction for event cascades")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Estimate every cascade series in a JSONL stream
    Estimate {
        /// Series records, one JSON object per line (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Where to write properties records (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        model: ModelArgs,

        /// Worker threads for estimation
        #[arg(short, long, default_value_t = 1)]
        workers: usize,

        /// Collect every cascade's magnitudes and write them to this file
        #[arg(long)]
        magnitudes: Option<String>,
    },

    /// Fit a single cascade given on the command line
    Fit {
        /// Events as `time:magnitude` pairs separated by commas
        #[arg(short, long)]
        events: String,

        /// Observation window in seconds
        #[arg(short = 'T', long)]
        window: f64,

        /// Cascade identifier
        #[arg(long, default_value = "cli")]
        cid: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print version information
    Version,
}

/// Process-wide model constants
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Fixed background intensity μ (events per second)
    #[arg(long, default_value_t = 1e-4)]
    pub background_rate: f64,

    /// Power-law prior shape
    #[arg(long, default_value_t = 2.4)]
    pub prior_shape: f64,

    /// Power-law prior scale
    #[arg(long, default_value_t = 10.0)]
    pub prior_scale: f64,

    /// Mark exponent ρ applied to magnitudes
    #[arg(long, default_value_t = 0.5)]
    pub magnitude_exponent: f64,

    /// Solver iteration budget
    #[arg(long, default_value_t = 5000)]
    pub max_iters: u64,

    /// Look-ahead for exogenous arrivals, in seconds
    #[arg(long, default_value_t = DEFAULT_LOOKAHEAD_SECS)]
    pub lookahead_secs: f64,

    /// Generations summed when the fit is near or above criticality
    #[arg(long, default_value_t = DEFAULT_MAX_GENERATIONS)]
    pub max_generations: u32,
}

impl ModelArgs {
    pub fn to_config(&self) -> EstimatorConfig {
        let mut config = EstimatorConfig::new()
            .with_background_rate(self.background_rate)
            .with_prior(Prior::new(self.prior_shape, self.prior_scale));
        config.magnitude_exponent = self.magnitude_exponent;
        config.solver.max_iters = self.max_iters;
        config.horizon.lookahead_secs = self.lookahead_secs;
        config.horizon.max_generations = self.max_generations;
        config
    }
}
