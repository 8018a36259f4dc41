//! Power-law Hawkes estimation and cascade size prediction

mod estimator;
mod kernel;
mod predictor;
mod service;
mod stream;

pub use estimator::{Estimator, MapEstimator, C_MIN};
pub use kernel::PowerLawKernel;
pub use predictor::{
    branching_ratio, family_size, worst_case_total, BranchingPredictor, Predictor,
    BORDERLINE_MARGIN, MAX_EFFECTIVE_RATIO,
};
pub use service::{CascadeEstimationService, Estimate};
pub use stream::{process_stream, StreamOptions, StreamStats};
