use crate::config::DriftConfig;
use crate::data::{Column, Dataset};
use crate::drift::notice::{DriftNotice, LogSink, NoticeSink};
use crate::drift::stats::kl_divergence;
use crate::errors::DriftError;
use crate::histogram::{probability_vector, PairedHistogram};
use crate::utils::fmt_name_set;
use hashbrown::HashMap;
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Drift scores keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriftScores {
    scores: HashMap<String, f64>,
}

impl DriftScores {
    pub fn new() -> Self {
        DriftScores::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, score: f64) {
        self.scores.insert(column.into(), score);
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.scores.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sorted names of the columns scoring above `threshold`.
    pub fn drifted(&self, threshold: f64) -> Vec<&str> {
        let mut cols: Vec<&str> = self.iter().filter(|(_, v)| *v > threshold).map(|(k, _)| k).collect();
        cols.sort_unstable();
        cols
    }
}

impl FromIterator<(String, f64)> for DriftScores {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        DriftScores {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Everything computed for a single column on the way to its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDrift {
    pub column: String,
    /// Shared bin edges, empty when neither sample had a value.
    pub edges: Vec<f64>,
    pub old_counts: Vec<usize>,
    pub new_counts: Vec<usize>,
    pub old_prob: Vec<f64>,
    pub new_prob: Vec<f64>,
    /// KL divergence of the new distribution from the old one.
    pub score: f64,
    pub old_missing: usize,
    pub new_missing: usize,
}

/// Score a single column pair.
///
/// * `old` - Column from the reference snapshot.
/// * `new` - Column from the current snapshot.
/// * `n_bins` - Number of equal width bins.
/// * `epsilon` - Constant added to every bin probability before renormalizing.
pub fn column_drift(old: &Column, new: &Column, n_bins: usize, epsilon: f64) -> ColumnDrift {
    let (old_values, old_missing) = old.present();
    let (new_values, new_missing) = new.present();
    if old_missing > 0 || new_missing > 0 {
        debug!(
            "Column {}: dropped {} missing old values and {} missing new values.",
            old.name, old_missing, new_missing
        );
    }

    let hist = match PairedHistogram::from_samples(&old_values, &new_values, n_bins) {
        Some(h) => h,
        None => {
            warn!("Column {} has no values in either sample, scoring it 0.", old.name);
            return ColumnDrift {
                column: old.name.clone(),
                edges: Vec::new(),
                old_counts: vec![0; n_bins],
                new_counts: vec![0; n_bins],
                old_prob: Vec::new(),
                new_prob: Vec::new(),
                score: 0.0,
                old_missing,
                new_missing,
            };
        }
    };
    if old_values.is_empty() || new_values.is_empty() {
        warn!(
            "Column {} has an empty {} sample, treating it as uniform.",
            old.name,
            if old_values.is_empty() { "old" } else { "new" }
        );
    }

    let old_prob = probability_vector(&hist.old_counts, epsilon);
    let new_prob = probability_vector(&hist.new_counts, epsilon);
    let score = kl_divergence(&new_prob, &old_prob);

    ColumnDrift {
        column: old.name.clone(),
        edges: hist.edges,
        old_counts: hist.old_counts,
        new_counts: hist.new_counts,
        old_prob,
        new_prob,
        score,
        old_missing,
        new_missing,
    }
}

fn column_pairs<'a>(old: &'a Dataset, new: &'a Dataset) -> Result<Vec<(&'a Column, &'a Column)>, DriftError> {
    let mismatch = || {
        let mut o = old.column_names();
        let mut n = new.column_names();
        o.sort_unstable();
        n.sort_unstable();
        DriftError::ColumnMismatch(format!("old {} vs new {}", fmt_name_set(o), fmt_name_set(n)))
    };
    if old.n_columns() != new.n_columns() {
        return Err(mismatch());
    }
    old.columns()
        .iter()
        .map(|o| new.column(&o.name).map(|n| (o, n)).ok_or_else(mismatch))
        .collect()
}

/// Calculate per column drift scores.
///
/// # Arguments
///
/// * `old` - The reference dataset.
/// * `new` - The dataset to compare against the reference, with the same columns.
/// * `cfg` - Binning, smoothing, threshold and parallelism settings.
/// * `sink` - Receives a notice for every column scoring above `cfg.threshold`.
pub fn compute_with_config(
    old: &Dataset,
    new: &Dataset,
    cfg: &DriftConfig,
    sink: &mut dyn NoticeSink,
) -> Result<DriftScores, DriftError> {
    cfg.validate()?;
    let pairs = column_pairs(old, new)?;

    let columns: Vec<ColumnDrift> = if cfg.parallel {
        pairs
            .par_iter()
            .map(|(o, n)| column_drift(o, n, cfg.n_bins, cfg.epsilon))
            .collect()
    } else {
        pairs
            .iter()
            .map(|(o, n)| column_drift(o, n, cfg.n_bins, cfg.epsilon))
            .collect()
    };

    let mut scores = DriftScores::new();
    for c in columns {
        if c.score > cfg.threshold {
            sink.notify(DriftNotice {
                column: c.column.clone(),
                score: c.score,
                threshold: cfg.threshold,
            });
        }
        scores.insert(c.column, c.score);
    }
    Ok(scores)
}

/// Calculate per column drift scores, sending notices to `sink`.
pub fn compute_with_sink(
    old: &Dataset,
    new: &Dataset,
    threshold: f64,
    sink: &mut dyn NoticeSink,
) -> Result<DriftScores, DriftError> {
    let cfg = DriftConfig {
        threshold,
        ..Default::default()
    };
    compute_with_config(old, new, &cfg, sink)
}

/// Calculate per column drift scores, logging drifted columns.
///
/// Each score is the KL divergence of the new sample's 20 bin histogram from the old one's,
/// over bins spanning both samples. `threshold` only decides which columns are logged.
pub fn compute(old: &Dataset, new: &Dataset, threshold: f64) -> Result<DriftScores, DriftError> {
    compute_with_sink(old, new, threshold, &mut LogSink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::notice::NullSink;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_dataset(seed: u64, n: usize) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let a: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() * 10.0).collect();
        let b: Vec<f64> = (0..n).map(|_| rng.gen::<f64>().powi(2)).collect();
        Dataset::new().with_column("a", a).unwrap().with_column("b", b).unwrap()
    }

    fn grid(n: usize, scale: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 / n as f64 * scale).collect()
    }

    #[test]
    fn test_identical_datasets_score_zero() {
        for seed in [0, 7, 42] {
            let ds = random_dataset(seed, 500);
            let scores = compute(&ds, &ds, 0.1).unwrap();
            assert_eq!(scores.len(), 2);
            for (_, v) in scores.iter() {
                assert!(v.abs() < 1e-10);
            }
        }
    }

    #[test]
    fn test_compute_is_deterministic() {
        let old = random_dataset(1, 300);
        let new = random_dataset(2, 300);
        let a = compute_with_sink(&old, &new, 0.1, &mut NullSink).unwrap();
        let b = compute_with_sink(&old, &new, 0.1, &mut NullSink).unwrap();
        for (k, v) in a.iter() {
            assert_eq!(v.to_bits(), b.get(k).unwrap().to_bits());
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let old = random_dataset(3, 400);
        let new = random_dataset(4, 400);
        let seq = compute_with_config(&old, &new, &DriftConfig::default(), &mut NullSink).unwrap();
        let cfg = DriftConfig {
            parallel: true,
            ..Default::default()
        };
        let par = compute_with_config(&old, &new, &cfg, &mut NullSink).unwrap();
        assert_eq!(seq, par);

        let old = Dataset::new()
            .with_column("a", grid(400, 1.0))
            .unwrap()
            .with_column("b", grid(400, 1.0))
            .unwrap()
            .with_column("c", grid(400, 1.0))
            .unwrap();
        let new = Dataset::new()
            .with_column("a", grid(400, 2.0))
            .unwrap()
            .with_column("b", grid(400, 1.5))
            .unwrap()
            .with_column("c", grid(400, 3.0))
            .unwrap();
        let mut seq_notices: Vec<DriftNotice> = Vec::new();
        let seq = compute_with_config(&old, &new, &DriftConfig::default(), &mut seq_notices).unwrap();
        let mut par_notices: Vec<DriftNotice> = Vec::new();
        let par = compute_with_config(&old, &new, &cfg, &mut par_notices).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq_notices, par_notices);
        let order: Vec<&str> = par_notices.iter().map(|n| n.column.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_overflowing_range_scores_finite() {
        let old = Dataset::new().with_column("x", vec![-1e308, 0.0]).unwrap();
        let new = Dataset::new().with_column("x", vec![0.0, 1e308]).unwrap();
        let scores = compute_with_sink(&old, &new, 0.1, &mut NullSink).unwrap();
        let score = scores.get("x").unwrap();
        assert!(score.is_finite());
        assert!(score > 0.1);
    }

    #[test]
    fn test_scaling_is_monotonic() {
        let old = Dataset::new().with_column("x", grid(1000, 1.0)).unwrap();
        let score = |factor: f64| {
            let new = Dataset::new().with_column("x", grid(1000, factor)).unwrap();
            compute_with_sink(&old, &new, 0.1, &mut NullSink).unwrap().get("x").unwrap()
        };
        let s = [score(1.0), score(1.1), score(1.5), score(2.0)];
        assert!(s[0].abs() < 1e-10);
        assert!(s[0] < s[1] && s[1] < s[2] && s[2] < s[3], "{:?}", s);
    }

    #[test]
    fn test_threshold_only_affects_notices() {
        let old = Dataset::new().with_column("x", grid(1000, 1.0)).unwrap();
        let new = Dataset::new().with_column("x", grid(1000, 2.0)).unwrap();

        let mut low: Vec<DriftNotice> = Vec::new();
        let mut high: Vec<DriftNotice> = Vec::new();
        let a = compute_with_sink(&old, &new, 0.1, &mut low).unwrap();
        let b = compute_with_sink(&old, &new, 1e6, &mut high).unwrap();
        assert_eq!(a, b);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].column, "x");
        assert!(high.is_empty());
    }

    #[test]
    fn test_zero_variance_column() {
        let old = Dataset::new().with_column("c", vec![3.0; 50]).unwrap();
        let scores = compute_with_sink(&old, &old.clone(), 0.1, &mut NullSink).unwrap();
        assert!(scores.get("c").unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_missing_values_are_dropped() {
        let old = Column::new("x", vec![1.0, 2.0, f64::NAN, 3.0]);
        let new = Column::new("x", vec![f64::NAN, 1.0, 2.0, 3.0, f64::NAN]);
        let c = column_drift(&old, &new, 20, 1e-10);
        assert_eq!(c.old_missing, 1);
        assert_eq!(c.new_missing, 2);
        assert_eq!(c.old_counts, c.new_counts);
        assert!(c.score.abs() < 1e-10);
    }

    #[test]
    fn test_all_missing_does_not_fail() {
        let old = Dataset::new().with_column("x", vec![f64::NAN; 4]).unwrap();
        let new = Dataset::new().with_column("x", vec![1.0, 2.0]).unwrap();
        let scores = compute_with_sink(&old, &new, 0.1, &mut NullSink).unwrap();
        assert!(scores.get("x").unwrap().is_finite());

        let both = compute_with_sink(&old, &old.clone(), 0.1, &mut NullSink).unwrap();
        assert_eq!(both.get("x"), Some(0.0));
    }

    #[test]
    fn test_column_drift_vectors() {
        let old = Column::new("x", grid(100, 1.0));
        let new = Column::new("x", grid(100, 1.5));
        let c = column_drift(&old, &new, 20, 1e-10);
        assert_eq!(c.edges.len(), 21);
        assert_eq!(c.old_counts.iter().sum::<usize>(), 100);
        assert!((c.old_prob.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((c.new_prob.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((c.score - kl_divergence(&c.new_prob, &c.old_prob)).abs() < 1e-15);
    }

    #[test]
    fn test_column_mismatch() {
        let old = Dataset::new().with_column("a", vec![1.0]).unwrap();
        let new = Dataset::new().with_column("b", vec![1.0]).unwrap();
        let err = compute(&old, &new, 0.1).unwrap_err();
        assert!(matches!(err, DriftError::ColumnMismatch(_)));
        assert!(err.to_string().contains("old {a} vs new {b}"));
    }

    #[test]
    fn test_invalid_threshold() {
        let ds = random_dataset(0, 10);
        assert!(matches!(
            compute(&ds, &ds, 0.0).unwrap_err(),
            DriftError::InvalidParameter(..)
        ));
    }

    #[test]
    fn test_drifted_is_sorted() {
        let scores: DriftScores = vec![("b".to_string(), 0.5), ("a".to_string(), 0.2), ("c".to_string(), 0.01)]
            .into_iter()
            .collect();
        assert_eq!(scores.drifted(0.1), vec!["a", "b"]);
        let json = serde_json::to_value(&scores).unwrap();
        assert!(json.is_object());
        assert_eq!(json["a"], 0.2);
    }
}
