//! driftgrade
//!
//! Histogram based KL drift estimation between two tabular snapshots, and a grader that checks a
//! candidate drift estimator against a reference on a fixed synthetic dataset pair.

// Modules
pub mod config;
pub mod constants;
pub mod data;
pub mod drift;
pub mod errors;
pub mod grader;
pub mod histogram;
pub mod utils;

// Individual classes, and functions
pub use config::{ConfigIO, DriftConfig, GraderConfig};
pub use data::{Dataset, Matrix};
pub use drift::{compute, compute_with_config, compute_with_sink, DriftEstimator, DriftScores, HistogramKl};
pub use errors::DriftError;
pub use grader::{grade, grade_with, GradeReport};
