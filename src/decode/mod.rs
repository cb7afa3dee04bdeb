//! Anchor-relative decoding of raw network outputs into frame-space boxes.
//!
//! Each offset row `(dx, dy, dw, dh)` is interpreted relative to the prior of
//! the same index: centers shift by `d * center_variance * prior_size` and
//! sizes scale by `exp(d * size_variance)`. Only anchors whose foreground
//! score strictly exceeds the threshold are decoded.

pub(crate) mod scalar;

#[cfg(feature = "rayon")]
pub(crate) mod rayon;

use crate::anchor::AnchorPrior;
use crate::candidate::DetectionCandidate;
use crate::tensor::{TensorView, OFFSET_COLS, SCORE_COLS};
use crate::trace::{trace_event, trace_span};
use crate::util::error::check_unit_interval;
use crate::util::{PriorBoxError, PriorBoxResult};

/// Center variance used by the SSD box encoding at training time.
pub const CENTER_VARIANCE: f32 = 0.1;
/// Size variance used by the SSD box encoding at training time.
pub const SIZE_VARIANCE: f32 = 0.2;

/// Decoder parameters.
///
/// The variances must match the encoding the model was trained with; only
/// change them together with the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodeConfig {
    /// Foreground scores must be strictly greater than this value.
    pub score_threshold: f32,
    /// Scale applied to center offsets.
    pub center_variance: f32,
    /// Scale applied to log-size offsets.
    pub size_variance: f32,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.7,
            center_variance: CENTER_VARIANCE,
            size_variance: SIZE_VARIANCE,
        }
    }
}

impl DecodeConfig {
    /// Creates a config with the default variances.
    pub fn with_threshold(score_threshold: f32) -> Self {
        Self {
            score_threshold,
            ..Self::default()
        }
    }

    /// Validates the threshold and variances.
    pub fn validate(&self) -> PriorBoxResult<()> {
        check_unit_interval("score_threshold", self.score_threshold)?;
        if !self.center_variance.is_finite() || self.center_variance <= 0.0 {
            return Err(PriorBoxError::InvalidConfig("center_variance must be finite and > 0"));
        }
        if !self.size_variance.is_finite() || self.size_variance <= 0.0 {
            return Err(PriorBoxError::InvalidConfig("size_variance must be finite and > 0"));
        }
        Ok(())
    }
}

/// Frame dimensions in pixels that decoded boxes are scaled to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameSize {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
}

impl FrameSize {
    /// Creates a frame size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Decoder bound to a validated configuration.
#[derive(Clone, Copy, Debug)]
pub struct BoxDecoder {
    cfg: DecodeConfig,
}

impl BoxDecoder {
    /// Creates a decoder, rejecting invalid configurations.
    pub fn new(cfg: DecodeConfig) -> PriorBoxResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the decoder configuration.
    pub fn config(&self) -> &DecodeConfig {
        &self.cfg
    }

    /// Decodes one frame sequentially.
    ///
    /// Candidates come out in ascending anchor order. The whole frame is
    /// rejected when either tensor disagrees with the prior count.
    pub fn decode(
        &self,
        offsets: TensorView<'_>,
        scores: TensorView<'_>,
        priors: &[AnchorPrior],
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<DetectionCandidate>> {
        check_shapes(offsets, scores, priors)?;
        let _span = trace_span!("decode", anchors = priors.len()).entered();
        let out = scalar::decode_rows(offsets, scores, priors, frame, &self.cfg);
        trace_event!("candidates_decoded", count = out.len());
        Ok(out)
    }

    /// Decodes one frame across the rayon thread pool.
    ///
    /// Produces exactly the same candidates in the same order as
    /// [`BoxDecoder::decode`].
    #[cfg(feature = "rayon")]
    pub fn decode_par(
        &self,
        offsets: TensorView<'_>,
        scores: TensorView<'_>,
        priors: &[AnchorPrior],
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<DetectionCandidate>> {
        check_shapes(offsets, scores, priors)?;
        let _span = trace_span!("decode", anchors = priors.len(), parallel = true).entered();
        let out = self::rayon::decode_rows_par(offsets, scores, priors, frame, &self.cfg);
        trace_event!("candidates_decoded", count = out.len());
        Ok(out)
    }
}

/// Decodes flat offset and score buffers against `priors`.
///
/// `offsets` holds `N x 4` values and `scores` holds `N x 2` values, where
/// `N == priors.len()`.
pub fn decode(
    offsets: &[f32],
    scores: &[f32],
    priors: &[AnchorPrior],
    frame: FrameSize,
    score_threshold: f32,
) -> PriorBoxResult<Vec<DetectionCandidate>> {
    let decoder = BoxDecoder::new(DecodeConfig::with_threshold(score_threshold))?;
    decoder.decode(
        TensorView::offsets(offsets)?,
        TensorView::scores(scores)?,
        priors,
        frame,
    )
}

fn check_shapes(
    offsets: TensorView<'_>,
    scores: TensorView<'_>,
    priors: &[AnchorPrior],
) -> PriorBoxResult<()> {
    offsets.expect_shape(priors.len(), OFFSET_COLS)?;
    scores.expect_shape(priors.len(), SCORE_COLS)?;
    Ok(())
}
