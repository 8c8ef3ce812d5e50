//! Configuration
//!
//! Settings for the drift estimator and the grader, loadable from and savable to JSON.
use crate::constants::{
    CANDIDATE_SYMBOL, CANDIDATE_TIMEOUT_SECS, DEFAULT_SEED, DEFAULT_THRESHOLD, KL_EPSILON, N_BINS, N_SYNTHETIC_ROWS,
    SCORE_TOLERANCE,
};
use crate::errors::DriftError;
use crate::utils::{validate_float_parameter, validate_positive_float_parameter, validate_positive_int_parameter};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

fn default_n_bins() -> usize {
    N_BINS
}
fn default_epsilon() -> f64 {
    KL_EPSILON
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_n_rows() -> usize {
    N_SYNTHETIC_ROWS
}
fn default_tolerance() -> f64 {
    SCORE_TOLERANCE
}
fn default_timeout_secs() -> f64 {
    CANDIDATE_TIMEOUT_SECS
}
fn default_symbol() -> String {
    CANDIDATE_SYMBOL.to_string()
}

/// Configuration for the drift estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Number of equal width bins per column.
    #[serde(default = "default_n_bins")]
    pub n_bins: usize,
    /// Constant added to every bin probability before renormalizing.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Columns scoring above this are reported as drifted. Scores are unaffected.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Score columns on the rayon thread pool.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for DriftConfig {
    fn default() -> Self {
        DriftConfig {
            n_bins: N_BINS,
            epsilon: KL_EPSILON,
            threshold: DEFAULT_THRESHOLD,
            parallel: false,
        }
    }
}

impl DriftConfig {
    pub fn validate(&self) -> Result<(), DriftError> {
        validate_positive_int_parameter(self.n_bins, "n_bins")?;
        validate_float_parameter(self.epsilon, f64::MIN_POSITIVE, 1.0, "epsilon")?;
        validate_positive_float_parameter(self.threshold, "threshold")
    }
}

/// Configuration for the grader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Seed for the synthetic dataset pair.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Rows per synthetic column.
    #[serde(default = "default_n_rows")]
    pub n_rows: usize,
    /// Threshold passed to the candidate and used to classify drift.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Largest accepted absolute difference from the reference score.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Hard limit for a single candidate invocation (seconds).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    /// Name the candidate module must export.
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

impl Default for GraderConfig {
    fn default() -> Self {
        GraderConfig {
            seed: DEFAULT_SEED,
            n_rows: N_SYNTHETIC_ROWS,
            threshold: DEFAULT_THRESHOLD,
            tolerance: SCORE_TOLERANCE,
            timeout_secs: CANDIDATE_TIMEOUT_SECS,
            symbol: CANDIDATE_SYMBOL.to_string(),
        }
    }
}

impl GraderConfig {
    /// Default configuration with a different seed.
    pub fn with_seed(seed: u64) -> Self {
        GraderConfig {
            seed,
            ..Default::default()
        }
    }

    /// Time the candidate is given, rejecting values a `Duration` cannot hold.
    pub fn timeout(&self) -> Result<Duration, DriftError> {
        validate_positive_float_parameter(self.timeout_secs, "timeout_secs")?;
        Duration::try_from_secs_f64(self.timeout_secs).map_err(|e| {
            DriftError::InvalidParameter(
                "timeout_secs".to_string(),
                "a representable duration in seconds".to_string(),
                format!("{} ({})", self.timeout_secs, e),
            )
        })
    }

    pub fn validate(&self) -> Result<(), DriftError> {
        validate_positive_int_parameter(self.n_rows, "n_rows")?;
        validate_positive_float_parameter(self.threshold, "threshold")?;
        validate_positive_float_parameter(self.tolerance, "tolerance")?;
        self.timeout().map(|_| ())
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save a configuration as a json object to a file.
    ///
    /// * `path` - Path to save the configuration.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), DriftError> {
        fs::write(path, self.json_dump()?).map_err(|e| DriftError::UnableToWrite(e.to_string()))
    }

    /// Dump a configuration as a json object.
    fn json_dump(&self) -> Result<String, DriftError> {
        serde_json::to_string(self).map_err(|e| DriftError::UnableToWrite(e.to_string()))
    }

    /// Load a configuration from a json string.
    ///
    /// * `json_str` - String object, which can be deserialized from json.
    fn from_json(json_str: &str) -> Result<Self, DriftError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| DriftError::UnableToRead(e.to_string()))
    }

    /// Load a configuration from a path to a json object.
    ///
    /// * `path` - Path to load the configuration from.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, DriftError> {
        let json_str = fs::read_to_string(path).map_err(|e| DriftError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for DriftConfig {}
impl ConfigIO for GraderConfig {}
