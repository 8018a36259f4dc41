//! Consume series records, emit properties records
//!
//! Records that fail to parse or carry another type tag are skipped with a
//! warning; the stream keeps going. Estimation runs on a rayon pool in
//! batches, and output follows input order.

use crate::estimator::Estimator;
use crate::predictor::Predictor;
use crate::service::CascadeEstimationService;
use cascade_records::{parse_record, write_jsonl, CascadeSeries, MagnitudeAccumulator};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Worker threads used for estimation
    pub workers: usize,
    /// Records buffered before a parallel estimation round
    pub batch_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub processed: usize,
    /// Malformed or wrong-type records
    pub rejected: usize,
    /// Records whose estimation failed
    pub failed: usize,
}

pub fn process_stream<R, W, E, P>(
    service: &CascadeEstimationService<E, P>,
    reader: R,
    writer: &mut W,
    options: StreamOptions,
    mut magnitudes: Option<&mut MagnitudeAccumulator>,
) -> std::io::Result<StreamStats>
where
    R: BufRead,
    W: Write,
    E: Estimator,
    P: Predictor,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers.max(1))
        .build()
        .map_err(std::io::Error::other)?;
    let batch_size = options.batch_size.max(1);

    let mut stats = StreamStats::default();
    let mut batch: Vec<CascadeSeries> = Vec::with_capacity(batch_size);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match parse_record(&line) {
            Ok(series) => {
                if let Some(acc) = magnitudes.as_deref_mut() {
                    acc.record(series.magnitudes());
                }
                batch.push(series);
            }
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping record");
                stats.rejected += 1;
                continue;
            }
        }

        if batch.len() >= batch_size {
            flush_batch(service, &pool, &mut batch, writer, &mut stats)?;
        }
    }
    flush_batch(service, &pool, &mut batch, writer, &mut stats)?;
    writer.flush()?;

    Ok(stats)
}

fn flush_batch<W, E, P>(
    service: &CascadeEstimationService<E, P>,
    pool: &rayon::ThreadPool,
    batch: &mut Vec<CascadeSeries>,
    writer: &mut W,
    stats: &mut StreamStats,
) -> std::io::Result<()>
where
    W: Write,
    E: Estimator,
    P: Predictor,
{
    if batch.is_empty() {
        return Ok(());
    }

    let results: Vec<_> = pool.install(|| batch.par_iter().map(|s| service.process(s)).collect());

    for (series, result) in batch.iter().zip(results) {
        match result {
            Ok(properties) => {
                write_jsonl(writer, &properties)?;
                info!(
                    cascade = %series.cid,
                    n_obs = properties.n_obs,
                    n_supp = properties.n_supp,
                    "properties emitted"
                );
                stats.processed += 1;
            }
            Err(e) => {
                error!(cascade = %series.cid, error = %e, "estimation failed");
                stats.failed += 1;
            }
        }
    }
    batch.clear();
    Ok(())
}
