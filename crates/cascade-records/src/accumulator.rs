//! Caller-owned collector of cascade magnitudes, kept for recalibrating the prior

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MagnitudeAccumulator {
    magnitudes: Vec<f64>,
    cascades: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MagnitudeSummary {
    pub cascades: usize,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl MagnitudeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one cascade's magnitude column
    pub fn record(&mut self, magnitudes: impl IntoIterator<Item = f64>) {
        self.magnitudes.extend(magnitudes);
        self.cascades += 1;
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn summary(&self) -> Option<MagnitudeSummary> {
        if self.magnitudes.is_empty() {
            return None;
        }
        let min = self.magnitudes.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self
            .magnitudes
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let mean = self.magnitudes.iter().sum::<f64>() / self.magnitudes.len() as f64;
        Some(MagnitudeSummary {
            cascades: self.cascades,
            count: self.magnitudes.len(),
            min,
            max,
            mean,
        })
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.magnitudes
    }
}
