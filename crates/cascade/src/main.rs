mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean JSONL stream
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Estimate {
            input,
            output,
            model,
            workers,
            magnitudes,
        } => commands::estimate::run(
            input.as_deref(),
            output.as_deref(),
            &model,
            workers,
            magnitudes.as_deref(),
        ),
        Commands::Fit {
            events,
            window,
            cid,
            model,
        } => commands::fit::run(&events, window, &cid, &model),
        Commands::Version => commands::version::run(),
    }
}
