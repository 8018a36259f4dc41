use crate::cli::ModelArgs;
use cascade_model::{process_stream, CascadeEstimationService, StreamOptions};
use cascade_records::{write_atomically, MagnitudeAccumulator};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

pub fn run(
    input: Option<&str>,
    output: Option<&str>,
    model: &ModelArgs,
    workers: usize,
    magnitudes: Option<&str>,
) -> anyhow::Result<()> {
    let config = model.to_config();
    let service = CascadeEstimationService::new(config)?;

    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(std::io::stdin().lock())),
    };
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut accumulator = magnitudes.map(|_| MagnitudeAccumulator::new());

    info!(
        background_rate = model.background_rate,
        prior_shape = model.prior_shape,
        prior_scale = model.prior_scale,
        workers,
        "estimating cascades"
    );

    let options = StreamOptions {
        workers,
        ..StreamOptions::default()
    };
    let stats = process_stream(
        &service,
        reader,
        &mut writer,
        options,
        accumulator.as_mut(),
    )?;

    info!(
        processed = stats.processed,
        rejected = stats.rejected,
        failed = stats.failed,
        "stream finished"
    );

    if let (Some(path), Some(acc)) = (magnitudes, accumulator) {
        if let Some(summary) = acc.summary() {
            info!(
                cascades = summary.cascades,
                count = summary.count,
                mean = summary.mean,
                "magnitudes collected"
            );
        }
        let columns = acc.into_inner();
        write_atomically(Path::new(path), |w| {
            serde_json::to_writer(w, &columns)?;
            Ok(())
        })?;
    }

    Ok(())
}
