use crate::errors::DriftError;
use serde::{Deserialize, Serialize};

/// Outcome of a grade: pass, or fail with ordered human readable reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    pub passed: bool,
    pub reasons: Vec<String>,
}

impl GradeReport {
    pub fn pass() -> Self {
        GradeReport {
            passed: true,
            reasons: Vec::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        GradeReport {
            passed: false,
            reasons: vec![reason.into()],
        }
    }

    pub fn fail_many(reasons: Vec<String>) -> Self {
        GradeReport {
            passed: false,
            reasons,
        }
    }

    pub fn to_json(&self) -> Result<String, DriftError> {
        serde_json::to_string(self).map_err(|e| DriftError::UnableToWrite(e.to_string()))
    }
}
