//! Numeric helpers shared by anchor generation and decoding.

/// Clamps a value to the closed unit interval.
#[inline]
pub(crate) fn clip01(value: f32) -> f32 {
    value.max(0.0).min(1.0)
}

/// Computes normalized `exp(score)` weights for a set of scores.
///
/// Scores are shifted by their maximum before exponentiation; the shift
/// cancels in the normalization.
pub(crate) fn exp_weights(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut weights: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let total: f32 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::{clip01, exp_weights};

    #[test]
    fn clip01_clamps_both_ends() {
        assert_eq!(clip01(-0.5), 0.0);
        assert_eq!(clip01(0.25), 0.25);
        assert_eq!(clip01(3.0), 1.0);
    }

    #[test]
    fn exp_weights_sum_to_one() {
        let weights = exp_weights(&[0.9, 0.5, 0.1]);
        let total: f32 = weights.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert!(weights[0] > weights[1] && weights[1] > weights[2]);

        let expected = 0.9f32.exp() / (0.9f32.exp() + 0.5f32.exp() + 0.1f32.exp());
        assert!((weights[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn exp_weights_single_member_is_one() {
        assert_eq!(exp_weights(&[0.3]), vec![1.0]);
    }
}
