//! Rayon-parallel decode (feature-gated).
//!
//! Anchors are independent, so the decode loop splits across the pool.
//! `collect` on an indexed parallel iterator keeps anchor order, which makes
//! the output identical to the sequential decoder.

use crate::anchor::AnchorPrior;
use crate::candidate::DetectionCandidate;
use crate::decode::scalar::decode_anchor;
use crate::decode::{DecodeConfig, FrameSize};
use crate::tensor::TensorView;
use rayon::prelude::*;

pub(crate) fn decode_rows_par(
    offsets: TensorView<'_>,
    scores: TensorView<'_>,
    priors: &[AnchorPrior],
    frame: FrameSize,
    cfg: &DecodeConfig,
) -> Vec<DetectionCandidate> {
    (0..priors.len())
        .into_par_iter()
        .filter_map(|i| decode_anchor(i, offsets, scores, priors, frame, cfg))
        .collect()
}
