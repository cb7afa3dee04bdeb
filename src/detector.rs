//! Frame-level detection facade: priors + decoder + suppressor.
//!
//! A [`Detector`] is built once per model configuration. Its priors are held
//! behind an `Arc`, so clones are cheap and share the same read-only prior
//! list across threads; every call to [`Detector::detect`] only touches
//! frame-local data.

use crate::anchor::{AnchorConfig, PriorSet};
use crate::candidate::Detection;
use crate::decode::{BoxDecoder, DecodeConfig, FrameSize};
use crate::nms::{SuppressConfig, Suppressor};
use crate::tensor::TensorView;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{PriorBoxError, PriorBoxResult};
use std::sync::Arc;

/// Complete post-processing configuration for one model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectorConfig {
    /// Prior layout of the model.
    pub anchors: AnchorConfig,
    /// Score threshold and box encoding variances.
    pub decode: DecodeConfig,
    /// IoU threshold, suppression mode and optional top-k cap.
    pub suppress: SuppressConfig,
    /// Decode anchors on the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
}

impl DetectorConfig {
    /// Validates every stage of the configuration.
    pub fn validate(&self) -> PriorBoxResult<()> {
        self.anchors.validate()?;
        self.decode.validate()?;
        self.suppress.validate()?;
        if self.parallel && !cfg!(feature = "rayon") {
            return Err(PriorBoxError::InvalidConfig(
                "parallel decode requires the `rayon` feature",
            ));
        }
        Ok(())
    }
}

/// Post-processor turning raw model outputs into deduplicated detections.
#[derive(Clone, Debug)]
pub struct Detector {
    priors: Arc<PriorSet>,
    decoder: BoxDecoder,
    suppressor: Suppressor,
    parallel: bool,
}

impl Detector {
    /// Validates `cfg` and generates its priors.
    pub fn new(cfg: DetectorConfig) -> PriorBoxResult<Self> {
        cfg.validate()?;
        let priors = Arc::new(PriorSet::generate(&cfg.anchors)?);
        Self::with_priors(priors, cfg)
    }

    /// Builds a detector around an existing, possibly shared, prior set.
    ///
    /// The anchor part of `cfg` is not used to regenerate priors.
    pub fn with_priors(priors: Arc<PriorSet>, cfg: DetectorConfig) -> PriorBoxResult<Self> {
        if cfg.parallel && !cfg!(feature = "rayon") {
            return Err(PriorBoxError::InvalidConfig(
                "parallel decode requires the `rayon` feature",
            ));
        }
        Ok(Self {
            priors,
            decoder: BoxDecoder::new(cfg.decode)?,
            suppressor: Suppressor::new(cfg.suppress)?,
            parallel: cfg.parallel,
        })
    }

    /// Returns the shared prior set.
    pub fn priors(&self) -> &Arc<PriorSet> {
        &self.priors
    }

    /// Returns the model input size `(width, height)`.
    pub fn input_size(&self) -> (usize, usize) {
        self.priors.input_size()
    }

    /// Returns the number of anchors each output tensor must have.
    pub fn num_anchors(&self) -> usize {
        self.priors.len()
    }

    /// Returns true if anchors are decoded on the rayon pool.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the decoder.
    pub fn decoder(&self) -> &BoxDecoder {
        &self.decoder
    }

    /// Returns the suppressor.
    pub fn suppressor(&self) -> &Suppressor {
        &self.suppressor
    }

    /// Decodes and suppresses one frame.
    ///
    /// `offsets` holds `N x 4` box offsets and `scores` holds `N x 2`
    /// `[background, foreground]` scores, flattened row-major, with `N` equal
    /// to [`Detector::num_anchors`]. Boxes are scaled to `frame`.
    pub fn detect(
        &self,
        offsets: &[f32],
        scores: &[f32],
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<Detection>> {
        self.detect_views(TensorView::offsets(offsets)?, TensorView::scores(scores)?, frame)
    }

    /// Decodes and suppresses one frame given shaped tensor views.
    ///
    /// Views built with [`TensorView::new`] keep the column count reported by
    /// the inference engine, so a wrong layout is reported as a column
    /// mismatch rather than as a row count error.
    pub fn detect_views(
        &self,
        offsets: TensorView<'_>,
        scores: TensorView<'_>,
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<Detection>> {
        let _span = trace_span!("detect", frame_width = frame.width, frame_height = frame.height)
            .entered();
        let candidates = self.decode_views(offsets, scores, frame)?;
        let detections = self.suppressor.suppress(&candidates);
        trace_event!(
            "frame_detected",
            candidates = candidates.len(),
            detections = detections.len()
        );
        Ok(detections)
    }

    /// Runs [`Detector::detect`] on an inference engine's output list.
    ///
    /// The first output must be the box offsets and the second the class
    /// scores; extra outputs are ignored.
    pub fn detect_outputs(
        &self,
        outputs: &[&[f32]],
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<Detection>> {
        match outputs {
            [offsets, scores, ..] => self.detect(offsets, scores, frame),
            _ => Err(PriorBoxError::ShapeMismatch {
                tensor: "outputs",
                expected: 2,
                got: outputs.len(),
            }),
        }
    }

    /// Like [`Detector::detect`], but a malformed frame yields no detections.
    ///
    /// The error is logged as a warning so a video loop can keep running and
    /// render the frame without overlays.
    pub fn detect_or_empty(
        &self,
        offsets: &[f32],
        scores: &[f32],
        frame: FrameSize,
    ) -> Vec<Detection> {
        match self.detect(offsets, scores, frame) {
            Ok(detections) => detections,
            Err(err) => {
                trace_warn!("skipping frame detections: {}", err);
                Vec::new()
            }
        }
    }

    #[cfg(feature = "rayon")]
    fn decode_views(
        &self,
        offsets: TensorView<'_>,
        scores: TensorView<'_>,
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<Detection>> {
        if self.parallel {
            self.decoder.decode_par(offsets, scores, &self.priors, frame)
        } else {
            self.decoder.decode(offsets, scores, &self.priors, frame)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn decode_views(
        &self,
        offsets: TensorView<'_>,
        scores: TensorView<'_>,
        frame: FrameSize,
    ) -> PriorBoxResult<Vec<Detection>> {
        self.decoder.decode(offsets, scores, &self.priors, frame)
    }
}
