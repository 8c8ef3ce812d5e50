//! Errors
//!
//! Custom error types used throughout the `driftgrade` crate.
use thiserror::Error;

/// Errors that can occur while estimating drift or grading a candidate.
#[derive(Debug, Error)]
pub enum DriftError {
    /// The old and new datasets do not share the same column names.
    #[error("Old and new datasets have different columns: {0}.")]
    ColumnMismatch(String),
    /// A column name was added twice to a dataset.
    #[error("Column {0} is already present in the dataset.")]
    DuplicateColumn(String),
    /// Number of names does not match the number of matrix columns.
    #[error("Expected {0} column names, but {1} were provided.")]
    ShapeMismatch(usize, usize),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to read a file or stream.
    #[error("Unable to read {0}")]
    UnableToRead(String),
    /// Unable to write a file or stream.
    #[error("Unable to write: {0}")]
    UnableToWrite(String),
    /// The candidate source could not be loaded.
    #[error("{0}")]
    CandidateLoad(String),
    /// The candidate failed while it was running.
    #[error("{0}")]
    CandidateFailed(String),
}
