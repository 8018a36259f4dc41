pub mod estimate;
pub mod fit;
pub mod version;
