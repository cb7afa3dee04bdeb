//! Deterministic score ordering for detection candidates.

use crate::candidate::Detection;
use std::cmp::Ordering;

fn score_cmp_desc(a: (usize, &Detection), b: (usize, &Detection)) -> Ordering {
    b.1.score.total_cmp(&a.1.score).then_with(|| a.0.cmp(&b.0))
}

/// Returns candidate indices sorted by descending score.
///
/// Equal scores keep their input order, so identical input always yields the
/// same ordering.
pub(crate) fn indices_by_score_desc(candidates: &[Detection]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| score_cmp_desc((a, &candidates[a]), (b, &candidates[b])));
    order
}

#[cfg(test)]
mod tests {
    use super::indices_by_score_desc;
    use crate::candidate::{Detection, Rect};

    fn det(score: f32) -> Detection {
        Detection::new(Rect::default(), score)
    }

    #[test]
    fn sorts_descending_with_stable_ties() {
        let dets = [det(0.5), det(0.9), det(0.5), det(0.7)];
        assert_eq!(indices_by_score_desc(&dets), vec![1, 3, 0, 2]);
    }

    #[test]
    fn empty_input_yields_empty_order() {
        assert!(indices_by_score_desc(&[]).is_empty());
    }
}
