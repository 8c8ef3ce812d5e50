/// KL divergence of `p` from the reference distribution `q`.
///
/// Formula: sum(p_i * ln(p_i / q_i))
///
/// Both vectors must have the same length and strictly positive entries,
/// which epsilon smoothing guarantees.
pub fn kl_divergence(p: &[f64], q: &[f64]) -> f64 {
    p.iter().zip(q).map(|(p_, q_)| p_ * (p_ / q_).ln()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kl_divergence() {
        // p = [0.5, 0.5], q = [0.25, 0.75]
        // 0.5 * ln(2) + 0.5 * ln(2/3) = 0.5 * ln(4/3)
        let kl = kl_divergence(&[0.5, 0.5], &[0.25, 0.75]);
        assert!((kl - 0.5 * (4.0_f64 / 3.0).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_kl_identical_is_zero() {
        let p = [0.1, 0.2, 0.3, 0.4];
        assert_eq!(kl_divergence(&p, &p), 0.0);
    }

    #[test]
    fn test_kl_is_asymmetric() {
        let p = [0.9, 0.1];
        let q = [0.5, 0.5];
        assert!((kl_divergence(&p, &q) - kl_divergence(&q, &p)).abs() > 1e-3);
    }
}
