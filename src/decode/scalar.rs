//! Sequential decode loop and the per-anchor box transform.

use crate::anchor::AnchorPrior;
use crate::candidate::{DetectionCandidate, Rect};
use crate::decode::{DecodeConfig, FrameSize};
use crate::tensor::TensorView;
use crate::util::math::clip01;

/// Index of the foreground column in a score row.
pub(crate) const FOREGROUND: usize = 1;

/// Transforms one `(dx, dy, dw, dh)` offset row into a frame-space box.
#[inline]
pub fn decode_box(
    offset: [f32; 4],
    prior: &AnchorPrior,
    frame: FrameSize,
    cfg: &DecodeConfig,
) -> Rect {
    let [dx, dy, dw, dh] = offset;
    let cx = dx * cfg.center_variance * prior.width + prior.center_x;
    let cy = dy * cfg.center_variance * prior.height + prior.center_y;
    let w = (dw * cfg.size_variance).exp() * prior.width;
    let h = (dh * cfg.size_variance).exp() * prior.height;

    let frame_w = frame.width as f32;
    let frame_h = frame.height as f32;
    Rect {
        x: clip01(cx - w / 2.0) * frame_w,
        y: clip01(cy - h / 2.0) * frame_h,
        width: clip01(w) * frame_w,
        height: clip01(h) * frame_h,
    }
}

/// Decodes the candidate for anchor `i`, if it passes the threshold.
///
/// Shapes must already be validated against the prior count.
#[inline]
pub(crate) fn decode_anchor(
    i: usize,
    offsets: TensorView<'_>,
    scores: TensorView<'_>,
    priors: &[AnchorPrior],
    frame: FrameSize,
    cfg: &DecodeConfig,
) -> Option<DetectionCandidate> {
    let score = *scores.row(i)?.get(FOREGROUND)?;
    if score.is_nan() || score <= cfg.score_threshold {
        return None;
    }
    let offset: [f32; 4] = offsets.row(i)?.try_into().ok()?;
    let prior = priors.get(i)?;
    Some(DetectionCandidate::new(
        decode_box(offset, prior, frame, cfg),
        score,
    ))
}

pub(crate) fn decode_rows(
    offsets: TensorView<'_>,
    scores: TensorView<'_>,
    priors: &[AnchorPrior],
    frame: FrameSize,
    cfg: &DecodeConfig,
) -> Vec<DetectionCandidate> {
    (0..priors.len())
        .filter_map(|i| decode_anchor(i, offsets, scores, priors, frame, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::decode_box;
    use crate::anchor::AnchorPrior;
    use crate::decode::{DecodeConfig, FrameSize};

    fn prior(cx: f32, cy: f32, w: f32, h: f32) -> AnchorPrior {
        AnchorPrior {
            center_x: cx,
            center_y: cy,
            width: w,
            height: h,
        }
    }

    #[test]
    fn zero_offsets_reproduce_the_prior() {
        let cfg = DecodeConfig::default();
        let rect = decode_box(
            [0.0; 4],
            &prior(0.5, 0.5, 0.2, 0.4),
            FrameSize::new(100, 50),
            &cfg,
        );
        assert!((rect.x - 40.0).abs() < 1e-4);
        assert!((rect.y - 15.0).abs() < 1e-4);
        assert!((rect.width - 20.0).abs() < 1e-4);
        assert!((rect.height - 20.0).abs() < 1e-4);
    }

    #[test]
    fn offsets_are_scaled_by_variances() {
        let cfg = DecodeConfig::default();
        let rect = decode_box(
            [1.0, -1.0, 1.0, 0.0],
            &prior(0.5, 0.5, 0.2, 0.2),
            FrameSize::new(1000, 1000),
            &cfg,
        );
        let w = 0.2f32.exp() * 0.2;
        let cx = 0.1 * 0.2 + 0.5;
        assert!((rect.width - w * 1000.0).abs() < 1e-2);
        assert!((rect.x - (cx - w / 2.0) * 1000.0).abs() < 1e-2);
        let cy = -0.1 * 0.2 + 0.5;
        assert!((rect.y - (cy - 0.1) * 1000.0).abs() < 1e-2);
    }

    #[test]
    fn corners_clip_to_frame() {
        let cfg = DecodeConfig::default();
        let rect = decode_box(
            [0.0; 4],
            &prior(0.0, 0.0, 0.5, 0.5),
            FrameSize::new(200, 100),
            &cfg,
        );
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 0.0);
        assert!((rect.width - 100.0).abs() < 1e-4);
    }
}
