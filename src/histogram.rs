//! Histogram
//!
//! Equal-width histograms over the combined range of an old and a new sample.
//! Both samples are counted against the same edges, so their probability vectors
//! line up bin for bin.
use crate::utils::min_max;

/// Evenly spaced bin edges over `[lo, hi]`, `n_bins + 1` of them.
///
/// The last edge is pinned to `hi`, so rounding never pushes the maximum out of range.
/// When `hi - lo` overflows, the width is taken from the scaled bounds instead.
pub fn bin_edges(lo: f64, hi: f64, n_bins: usize) -> Vec<f64> {
    let n = n_bins as f64;
    let mut step = (hi - lo) / n;
    if !step.is_finite() {
        step = hi / n - lo / n;
    }
    let mut edges: Vec<f64> = (0..n_bins).map(|i| lo + i as f64 * step).collect();
    edges.push(hi);
    edges
}

/// Index of the bin holding `v`.
///
/// Bins are half open, `[e_i, e_i+1)`, except the last one which also holds `hi`.
/// When every edge is equal, all values land in the last bin.
#[inline]
pub fn bin_index(edges: &[f64], v: f64) -> usize {
    let n_bins = edges.len() - 1;
    edges.partition_point(|e| *e <= v).saturating_sub(1).min(n_bins - 1)
}

/// Raw frequencies of `sample` against `edges`.
pub fn bin_counts(sample: &[f64], edges: &[f64]) -> Vec<usize> {
    let mut counts = vec![0; edges.len() - 1];
    for v in sample {
        counts[bin_index(edges, *v)] += 1;
    }
    counts
}

/// Counts divided by their total. An empty histogram stays all zeros.
pub fn probabilities(counts: &[usize]) -> Vec<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    let total = total as f64;
    counts.iter().map(|c| *c as f64 / total).collect()
}

/// Add `epsilon` to every bin, then renormalize to sum to one.
pub fn smooth(prob: &[f64], epsilon: f64) -> Vec<f64> {
    let shifted: Vec<f64> = prob.iter().map(|p| p + epsilon).collect();
    let total: f64 = shifted.iter().sum();
    shifted.iter().map(|p| p / total).collect()
}

/// Normalized and epsilon smoothed probability vector of a histogram.
pub fn probability_vector(counts: &[usize], epsilon: f64) -> Vec<f64> {
    smooth(&probabilities(counts), epsilon)
}

/// Histograms of an old and a new sample over shared edges.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedHistogram {
    /// Shared bin edges, one more than the number of bins.
    pub edges: Vec<f64>,
    pub old_counts: Vec<usize>,
    pub new_counts: Vec<usize>,
}

impl PairedHistogram {
    /// Bin both samples over the combined range.
    ///
    /// Samples must already be free of missing values.
    /// Returns `None` when both samples are empty, there is no range to bin over.
    pub fn from_samples(old: &[f64], new: &[f64], n_bins: usize) -> Option<Self> {
        let (lo, hi) = match (min_max(old), min_max(new)) {
            (Some((lo_o, hi_o)), Some((lo_n, hi_n))) => (lo_o.min(lo_n), hi_o.max(hi_n)),
            (Some(r), None) | (None, Some(r)) => r,
            (None, None) => return None,
        };
        let edges = bin_edges(lo, hi, n_bins);
        let old_counts = bin_counts(old, &edges);
        let new_counts = bin_counts(new, &edges);
        Some(PairedHistogram {
            edges,
            old_counts,
            new_counts,
        })
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }
}
