//! Wire records for the series and properties streams

use serde::{Deserialize, Serialize};

/// Type tag carried by cascade series records
pub const SERIES_TYPE: &str = "serie";

/// Type tag carried by cascade properties records
pub const PROPERTIES_TYPE: &str = "parameters";

/// A partially observed cascade, as delivered by the transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeSeries {
    #[serde(rename = "type")]
    pub kind: String,
    pub cid: String,
    /// Observation window in seconds
    #[serde(rename = "T_obs")]
    pub window: f64,
    /// Opaque payload echoed back unchanged
    #[serde(default)]
    pub msg: serde_json::Value,
    /// `[absolute_time, magnitude]` pairs, sorted by time
    pub tweets: Vec<(f64, f64)>,
}

impl CascadeSeries {
    pub fn new(cid: impl Into<String>, window: f64, tweets: Vec<(f64, f64)>) -> Self {
        Self {
            kind: SERIES_TYPE.to_string(),
            cid: cid.into(),
            window,
            msg: serde_json::Value::Null,
            tweets,
        }
    }

    pub fn is_series(&self) -> bool {
        self.kind == SERIES_TYPE
    }

    pub fn magnitudes(&self) -> impl Iterator<Item = f64> + '_ {
        self.tweets.iter().map(|&(_, m)| m)
    }
}

/// Estimation output for one cascade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeProperties {
    #[serde(rename = "type")]
    pub kind: String,
    pub cid: String,
    pub msg: serde_json::Value,
    pub n_obs: usize,
    /// Predicted number of events still to come; may be negative
    pub n_supp: i64,
    /// Kernel parameters as a plain list `[kappa, c, theta]`
    pub params: Vec<f64>,
}

impl CascadeProperties {
    pub fn new(series: &CascadeSeries, n_obs: usize, n_supp: i64, params: Vec<f64>) -> Self {
        Self {
            kind: PROPERTIES_TYPE.to_string(),
            cid: series.cid.clone(),
            msg: series.msg.clone(),
            n_obs,
            n_supp,
            params,
        }
    }
}
