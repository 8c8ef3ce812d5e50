use crate::errors::DriftError;
use std::fmt::Display;

/// Create a string of all available items.
pub fn items_to_strings<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    items.into_iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

/// Format a set of names the way the grader reports them, `{a, b, c}`.
pub fn fmt_name_set<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: Display,
{
    format!("{{{}}}", items_to_strings(items))
}

// Validation
pub fn validate_positive_float_parameter(value: f64, parameter: &str) -> Result<(), DriftError> {
    if value.is_nan() || value <= 0.0 || value.is_infinite() {
        Err(DriftError::InvalidParameter(
            parameter.to_string(),
            "a positive finite real value".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_float_parameter(value: f64, min: f64, max: f64, parameter: &str) -> Result<(), DriftError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(DriftError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

pub fn validate_positive_int_parameter(value: usize, parameter: &str) -> Result<(), DriftError> {
    if value == 0 {
        Err(DriftError::InvalidParameter(
            parameter.to_string(),
            "a positive integer".to_string(),
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Calculate if a value should be treated as missing.
///
/// Infinite values are missing as well, equal width bins need a finite range.
#[inline]
pub fn is_missing(value: &f64) -> bool {
    !value.is_finite()
}

/// Minimum and maximum of a slice, `None` when empty.
pub fn min_max(v: &[f64]) -> Option<(f64, f64)> {
    v.iter().fold(None, |acc, &x| match acc {
        None => Some((x, x)),
        Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
    })
}
