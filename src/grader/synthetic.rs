//! Synthetic data
//!
//! The fixed dataset pair the grader checks candidates on. Every draw comes from a
//! `StdRng` seeded here, so the pair depends on the seed alone.
use crate::data::Dataset;
use crate::errors::DriftError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Columns whose new version is expected to drift.
pub const DRIFT_COLUMNS: [&str; 2] = ["age", "income"];
/// Column left unchanged in the new version.
pub const STABLE_COLUMN: &str = "height";

/// Scale applied to `income` in the new version.
const INCOME_SCALE: f64 = 1.1;

/// Every column of the synthetic pair, sorted.
pub fn expected_columns() -> Vec<&'static str> {
    let mut cols: Vec<&str> = DRIFT_COLUMNS.to_vec();
    cols.push(STABLE_COLUMN);
    cols.sort_unstable();
    cols
}

#[derive(Debug, Clone)]
pub struct SyntheticPair {
    pub old: Dataset,
    pub new: Dataset,
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, DriftError> {
    Normal::new(mean, std_dev).map_err(|e| {
        DriftError::InvalidParameter(
            "std_dev".to_string(),
            "a finite non-negative standard deviation".to_string(),
            format!("{} ({})", std_dev, e),
        )
    })
}

fn draw(dist: Normal<f64>, rng: &mut StdRng, n: usize) -> Vec<f64> {
    dist.sample_iter(rng).take(n).collect()
}

/// Generate the old and new datasets.
///
/// * `age ~ N(40, 10)`, the new version adds `N(5, 2)` noise, shifting and widening it.
/// * `income ~ N(60000, 8000)`, the new version is scaled by 1.1.
/// * `height ~ N(170, 7)`, unchanged.
///
/// * `seed` - Seed for the local random number generator.
/// * `n_rows` - Number of rows in each column.
pub fn synthesize(seed: u64, n_rows: usize) -> Result<SyntheticPair, DriftError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let age = draw(normal(40.0, 10.0)?, &mut rng, n_rows);
    let income = draw(normal(60000.0, 8000.0)?, &mut rng, n_rows);
    let height = draw(normal(170.0, 7.0)?, &mut rng, n_rows);
    let age_noise = draw(normal(5.0, 2.0)?, &mut rng, n_rows);

    let new_age: Vec<f64> = age.iter().zip(&age_noise).map(|(a, e)| a + e).collect();
    let new_income: Vec<f64> = income.iter().map(|v| v * INCOME_SCALE).collect();

    let old = Dataset::new()
        .with_column("age", age)?
        .with_column("income", income)?
        .with_column("height", height.clone())?;
    let new = Dataset::new()
        .with_column("age", new_age)?
        .with_column("income", new_income)?
        .with_column("height", height)?;
    Ok(SyntheticPair { old, new })
}
