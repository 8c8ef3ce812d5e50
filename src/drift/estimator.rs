use crate::config::DriftConfig;
use crate::data::Dataset;
use crate::drift::calculation::{compute_with_config, DriftScores};
use crate::drift::notice::NoticeSink;
use crate::errors::DriftError;

/// A drift estimation strategy.
///
/// Implementations score every column shared by `old` and `new`, and send a notice to
/// `sink` for each column scoring above `threshold`.
pub trait DriftEstimator {
    fn estimate(
        &self,
        old: &Dataset,
        new: &Dataset,
        threshold: f64,
        sink: &mut dyn NoticeSink,
    ) -> Result<DriftScores, DriftError>;
}

/// Equal width histogram KL divergence, the crate's own estimator.
#[derive(Debug, Clone, Default)]
pub struct HistogramKl {
    pub cfg: DriftConfig,
}

impl HistogramKl {
    pub fn new(cfg: DriftConfig) -> Self {
        HistogramKl { cfg }
    }
}

impl DriftEstimator for HistogramKl {
    fn estimate(
        &self,
        old: &Dataset,
        new: &Dataset,
        threshold: f64,
        sink: &mut dyn NoticeSink,
    ) -> Result<DriftScores, DriftError> {
        let cfg = DriftConfig {
            threshold,
            ..self.cfg.clone()
        };
        compute_with_config(old, new, &cfg, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::calculation::compute_with_sink;
    use crate::drift::notice::{DriftNotice, NullSink};

    #[test]
    fn test_histogram_kl_matches_compute() {
        let old = Dataset::new().with_column("x", vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let new = Dataset::new().with_column("x", vec![2.0, 3.0, 4.0, 8.0]).unwrap();
        let est = HistogramKl::default();
        let a = est.estimate(&old, &new, 0.1, &mut NullSink).unwrap();
        let b = compute_with_sink(&old, &new, 0.1, &mut NullSink).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_histogram_kl_uses_threshold_argument() {
        let old = Dataset::new().with_column("x", vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let new = Dataset::new().with_column("x", vec![7.0, 8.0, 9.0, 10.0]).unwrap();
        let est = HistogramKl::new(DriftConfig {
            threshold: 1e9,
            ..Default::default()
        });
        let mut notices: Vec<DriftNotice> = Vec::new();
        est.estimate(&old, &new, 0.1, &mut notices).unwrap();
        assert_eq!(notices.len(), 1);
    }
}
