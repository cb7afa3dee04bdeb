//! Greedy IoU clustering.

use crate::candidate::order::indices_by_score_desc;
use crate::candidate::Detection;

/// Groups candidates into clusters of mutually redundant boxes.
///
/// Clusters are opened in descending score order; the first index of every
/// cluster is its seed. A candidate joins the first open cluster whose seed
/// it overlaps by strictly more than `iou_threshold`.
pub(crate) fn greedy_clusters(candidates: &[Detection], iou_threshold: f32) -> Vec<Vec<usize>> {
    let order = indices_by_score_desc(candidates);
    let mut consumed = vec![false; candidates.len()];
    let mut clusters = Vec::new();

    for (pos, &seed) in order.iter().enumerate() {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;
        let seed_box = candidates[seed].bbox;
        let mut cluster = vec![seed];
        for &other in &order[pos + 1..] {
            if consumed[other] {
                continue;
            }
            if seed_box.iou(&candidates[other].bbox) > iou_threshold {
                consumed[other] = true;
                cluster.push(other);
            }
        }
        clusters.push(cluster);
    }

    clusters
}

#[cfg(test)]
mod tests {
    use super::greedy_clusters;
    use crate::candidate::{Detection, Rect};

    #[test]
    fn overlapping_boxes_share_a_cluster() {
        let dets = [
            Detection::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0.6),
            Detection::new(Rect::new(50.0, 50.0, 10.0, 10.0), 0.7),
            Detection::new(Rect::new(1.0, 1.0, 10.0, 10.0), 0.9),
        ];
        let clusters = greedy_clusters(&dets, 0.3);
        assert_eq!(clusters, vec![vec![2, 0], vec![1]]);
    }

    #[test]
    fn membership_is_decided_against_the_seed_only() {
        // b overlaps both a and c, but a and c are disjoint.
        let dets = [
            Detection::new(Rect::new(0.0, 0.0, 10.0, 10.0), 0.9),
            Detection::new(Rect::new(4.0, 0.0, 10.0, 10.0), 0.8),
            Detection::new(Rect::new(8.0, 0.0, 10.0, 10.0), 0.7),
        ];
        let clusters = greedy_clusters(&dets, 0.3);
        assert_eq!(clusters, vec![vec![0, 1], vec![2]]);
    }
}
