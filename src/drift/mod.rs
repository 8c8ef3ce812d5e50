//! Drift Detection Logic
//!
//! This module scores distribution drift between an old and a new snapshot of a dataset,
//! one histogram KL divergence per column.

pub mod calculation;
pub mod estimator;
pub mod notice;
pub mod stats;

pub use calculation::{column_drift, compute, compute_with_config, compute_with_sink, ColumnDrift, DriftScores};
pub use estimator::{DriftEstimator, HistogramKl};
pub use notice::{DriftNotice, LogSink, NoticeSink, NullSink};
pub use stats::kl_divergence;
