//! Shift a raw event list to a zero-origin observation

use crate::error::{EstimationError, Result};
use crate::types::{Event, Observation};

/// Turn `(absolute_time, magnitude)` pairs into an observation whose first event is at 0.
///
/// The input must be non-empty and sorted by time. Magnitudes pass through unchanged.
pub fn normalize(cascade_id: &str, raw: &[(f64, f64)], window: f64) -> Result<Observation> {
    let Some(&(origin, _)) = raw.first() else {
        return Err(EstimationError::EmptyCascade {
            cascade_id: cascade_id.to_string(),
        });
    };

    let events = raw
        .iter()
        .map(|&(time, magnitude)| Event::new(time - origin, magnitude))
        .collect();

    Observation::new(cascade_id, window, events)
}
