//! Anchor (prior box) generation for SSD-style detection heads.
//!
//! Priors are laid out level by level; within a level, cells are visited
//! row-major (`y` outer, `x` inner) and every min box size of the level is
//! emitted per cell. The network emits its score and offset rows in the same
//! order, so prior `i` describes row `i` of both output tensors.

mod grid;

pub use grid::FeatureGrid;

use crate::trace::{trace_event, trace_span};
use crate::util::math::clip01;
use crate::util::{PriorBoxError, PriorBoxResult};
use std::ops::Deref;

/// Reference box in coordinates normalized to the model input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPrior {
    /// Normalized center x in [0, 1].
    pub center_x: f32,
    /// Normalized center y in [0, 1].
    pub center_y: f32,
    /// Normalized width in [0, 1].
    pub width: f32,
    /// Normalized height in [0, 1].
    pub height: f32,
}

impl AnchorPrior {
    /// Returns true if every field lies in [0, 1].
    pub fn is_normalized(&self) -> bool {
        [self.center_x, self.center_y, self.width, self.height]
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    }
}

/// Feature-pyramid configuration for a model input resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorConfig {
    /// Model input width in pixels.
    pub input_width: usize,
    /// Model input height in pixels.
    pub input_height: usize,
    /// Feature-map stride per pyramid level.
    pub strides: Vec<f32>,
    /// Minimum box sizes in input pixels, one list per pyramid level.
    pub min_boxes: Vec<Vec<f32>>,
}

impl Default for AnchorConfig {
    /// The slim UltraFace 320x240 layout.
    fn default() -> Self {
        Self {
            input_width: 320,
            input_height: 240,
            strides: vec![8.0, 16.0, 32.0, 64.0],
            min_boxes: vec![
                vec![10.0, 16.0, 24.0],
                vec![32.0, 48.0],
                vec![64.0, 96.0],
                vec![128.0, 192.0, 256.0],
            ],
        }
    }
}

impl AnchorConfig {
    /// Validates the pyramid description.
    pub fn validate(&self) -> PriorBoxResult<()> {
        if self.input_width == 0 || self.input_height == 0 {
            return Err(PriorBoxError::InvalidConfig("input size must be non-zero"));
        }
        if self.strides.len() != self.min_boxes.len() {
            return Err(PriorBoxError::LevelCountMismatch {
                strides: self.strides.len(),
                min_boxes: self.min_boxes.len(),
            });
        }
        if self.strides.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(PriorBoxError::InvalidConfig("strides must be finite and > 0"));
        }
        if self.strides.iter().any(|s| *s < 1.0) {
            return Err(PriorBoxError::InvalidConfig("strides must be at least one input pixel"));
        }
        if self.min_boxes.iter().flatten().any(|k| !k.is_finite() || *k <= 0.0) {
            return Err(PriorBoxError::InvalidConfig("min box sizes must be finite and > 0"));
        }
        Ok(())
    }

    /// Returns the number of priors this configuration generates.
    pub fn expected_len(&self) -> PriorBoxResult<usize> {
        self.validate()?;
        let mut total = 0usize;
        for (&stride, sizes) in self.strides.iter().zip(&self.min_boxes) {
            let grid = FeatureGrid::new(self.input_width, self.input_height, stride)?;
            total = grid
                .cells()
                .checked_mul(sizes.len())
                .and_then(|n| total.checked_add(n))
                .ok_or(PriorBoxError::InvalidConfig("prior count overflows"))?;
        }
        Ok(total)
    }
}

/// Immutable, ordered list of priors for one input resolution.
///
/// Generated once at setup and shared read-only across frames; wrap it in an
/// `Arc` to share it across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct PriorSet {
    priors: Vec<AnchorPrior>,
    input_width: usize,
    input_height: usize,
}

impl PriorSet {
    /// Generates the priors described by `cfg`.
    pub fn generate(cfg: &AnchorConfig) -> PriorBoxResult<Self> {
        cfg.validate()?;
        let _span = trace_span!(
            "generate_priors",
            input_width = cfg.input_width,
            input_height = cfg.input_height,
            levels = cfg.strides.len()
        )
        .entered();

        let input_w = cfg.input_width as f32;
        let input_h = cfg.input_height as f32;
        let mut priors = Vec::with_capacity(cfg.expected_len()?);
        for (&stride, sizes) in cfg.strides.iter().zip(&cfg.min_boxes) {
            let grid = FeatureGrid::new(cfg.input_width, cfg.input_height, stride)?;
            for j in 0..grid.height() {
                for i in 0..grid.width() {
                    let (cx, cy) = grid.cell_center(i, j);
                    for &k in sizes {
                        priors.push(AnchorPrior {
                            center_x: clip01(cx),
                            center_y: clip01(cy),
                            width: clip01(k / input_w),
                            height: clip01(k / input_h),
                        });
                    }
                }
            }
        }

        trace_event!("priors_generated", count = priors.len());
        Ok(Self {
            priors,
            input_width: cfg.input_width,
            input_height: cfg.input_height,
        })
    }

    /// Wraps an explicit prior list, e.g. one exported alongside a model.
    ///
    /// Every field must already lie in [0, 1].
    pub fn from_priors(
        priors: Vec<AnchorPrior>,
        input_width: usize,
        input_height: usize,
    ) -> PriorBoxResult<Self> {
        if input_width == 0 || input_height == 0 {
            return Err(PriorBoxError::InvalidConfig("input size must be non-zero"));
        }
        if !priors.iter().all(AnchorPrior::is_normalized) {
            return Err(PriorBoxError::InvalidConfig("prior fields must lie in [0, 1]"));
        }
        Ok(Self {
            priors,
            input_width,
            input_height,
        })
    }

    /// Returns the model input size `(width, height)` the priors were built for.
    pub fn input_size(&self) -> (usize, usize) {
        (self.input_width, self.input_height)
    }

    /// Returns the priors as a slice.
    pub fn as_slice(&self) -> &[AnchorPrior] {
        &self.priors
    }
}

impl Deref for PriorSet {
    type Target = [AnchorPrior];

    fn deref(&self) -> &Self::Target {
        &self.priors
    }
}

/// Generates priors from loose pyramid parameters.
pub fn generate(
    input_width: usize,
    input_height: usize,
    strides: &[f32],
    min_boxes: &[Vec<f32>],
) -> PriorBoxResult<PriorSet> {
    PriorSet::generate(&AnchorConfig {
        input_width,
        input_height,
        strides: strides.to_vec(),
        min_boxes: min_boxes.to_vec(),
    })
}
