//! Reference scores
//!
//! The grader's own histogram KL, kept separate from `crate::histogram` so a defect there
//! cannot hide the same defect in a candidate built on it.
use crate::data::Dataset;
use hashbrown::HashMap;

fn counts(sample: &[f64], lo: f64, hi: f64, n_bins: usize) -> Vec<f64> {
    let mut c = vec![0.0; n_bins];
    let width = (hi - lo) / n_bins as f64;
    for &v in sample {
        let i = if width > 0.0 {
            ((v - lo) / width).floor() as usize
        } else {
            n_bins - 1
        };
        c[i.min(n_bins - 1)] += 1.0;
    }
    c
}

fn smoothed(mut c: Vec<f64>, epsilon: f64) -> Vec<f64> {
    let total: f64 = c.iter().sum();
    if total > 0.0 {
        c.iter_mut().for_each(|v| *v /= total);
    }
    c.iter_mut().for_each(|v| *v += epsilon);
    let total: f64 = c.iter().sum();
    c.iter_mut().for_each(|v| *v /= total);
    c
}

/// KL divergence of the new sample's histogram from the old sample's.
pub fn reference_score(old: &[f64], new: &[f64], n_bins: usize, epsilon: f64) -> f64 {
    let x: Vec<f64> = old.iter().copied().filter(|v| v.is_finite()).collect();
    let y: Vec<f64> = new.iter().copied().filter(|v| v.is_finite()).collect();
    if x.is_empty() && y.is_empty() {
        return 0.0;
    }
    let lo = x.iter().chain(&y).copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().chain(&y).copied().fold(f64::NEG_INFINITY, f64::max);

    let p = smoothed(counts(&x, lo, hi, n_bins), epsilon);
    let q = smoothed(counts(&y, lo, hi, n_bins), epsilon);
    q.iter().zip(&p).map(|(q_, p_)| q_ * (q_ / p_).ln()).sum()
}

/// Reference scores for the named columns present in both datasets.
pub fn reference_scores(
    old: &Dataset,
    new: &Dataset,
    columns: &[&str],
    n_bins: usize,
    epsilon: f64,
) -> HashMap<String, f64> {
    columns
        .iter()
        .filter_map(|name| {
            let o = old.column(name)?;
            let n = new.column(name)?;
            Some((name.to_string(), reference_score(&o.values, &n.values, n_bins, epsilon)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;
    use crate::drift::{column_drift, kl_divergence};
    use crate::grader::synthetic::{expected_columns, synthesize};

    #[test]
    fn test_reference_agrees_with_estimator() {
        let pair = synthesize(42, 2000).unwrap();
        let refs = reference_scores(&pair.old, &pair.new, &expected_columns(), 20, 1e-10);
        for name in expected_columns() {
            let c = column_drift(
                pair.old.column(name).unwrap(),
                pair.new.column(name).unwrap(),
                20,
                1e-10,
            );
            assert!((refs[name] - c.score).abs() < 1e-6, "{}: {} vs {}", name, refs[name], c.score);
        }
    }

    #[test]
    fn test_reference_identical_is_zero() {
        let v = vec![1.0, 2.0, 2.5, 9.0];
        assert!(reference_score(&v, &v, 20, 1e-10).abs() < 1e-10);
        assert_eq!(reference_score(&[f64::NAN], &[f64::NAN], 20, 1e-10), 0.0);
    }

    #[test]
    fn test_reference_direction() {
        // new concentrated where old is spread: KL(new || old) = ln(2) for two bins.
        let old = vec![0.0, 1.0];
        let new = vec![0.0, 0.0];
        let score = reference_score(&old, &new, 2, 1e-10);
        let c = column_drift(&Column::new("x", old), &Column::new("x", new), 2, 1e-10);
        assert!((score - 2.0_f64.ln()).abs() < 1e-6);
        assert!((score - kl_divergence(&c.new_prob, &c.old_prob)).abs() < 1e-12);
    }
}
