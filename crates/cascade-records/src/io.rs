//! JSONL record I/O and atomic file writes

use crate::types::CascadeSeries;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected record type {kind:?} for cascade {cid}")]
    WrongType { cid: String, kind: String },
}

/// Parse one JSONL line into a series record, rejecting other record types
pub fn parse_record(line: &str) -> Result<CascadeSeries, RecordError> {
    let series: CascadeSeries = serde_json::from_str(line)?;
    if !series.is_series() {
        return Err(RecordError::WrongType {
            cid: series.cid,
            kind: series.kind,
        });
    }
    Ok(series)
}

/// Write a record as a single JSON line
pub fn write_jsonl<W: Write, T: Serialize>(writer: &mut W, record: &T) -> std::io::Result<()> {
    let json = serde_json::to_string(record)?;
    writeln!(writer, "{}", json)
}

/// Stream a file's contents through `fill`; `path` only appears once `fill`
/// and the final flush succeed, otherwise the partial file is removed.
pub fn write_atomically<F>(path: &Path, fill: F) -> std::io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let partial = path.with_extension("partial");
    let mut writer = BufWriter::new(File::create(&partial)?);
    let written = fill(&mut writer).and_then(|()| writer.flush());
    drop(writer);

    match written {
        Ok(()) => std::fs::rename(&partial, path),
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}
