//! Boundary records exchanged with the transport layer, JSONL I/O and diagnostics

mod accumulator;
mod io;
mod types;

pub use accumulator::{MagnitudeAccumulator, MagnitudeSummary};
pub use io::{parse_record, write_atomically, write_jsonl, RecordError};
pub use types::{CascadeProperties, CascadeSeries, PROPERTIES_TYPE, SERIES_TYPE};
