//! Non-maximum suppression over decoded candidates.
//!
//! Candidates are clustered greedily by descending score (see
//! [`SuppressionMode`] for how a cluster collapses into one detection).
//! Overlap is measured with raw floating-point IoU; there is no
//! one-pixel-inclusive corner convention.

mod cluster;

use crate::candidate::{Detection, DetectionCandidate, Rect};
use crate::trace::{trace_event, trace_span};
use crate::util::error::check_unit_interval;
use crate::util::math::exp_weights;
use crate::util::{PriorBoxError, PriorBoxResult};
use std::fmt;
use std::str::FromStr;

/// How a cluster of overlapping candidates becomes a single detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuppressionMode {
    /// Keep the highest-scoring member unchanged.
    Hard,
    /// Average members with `exp(score)` weights.
    Blend,
}

impl SuppressionMode {
    /// Returns the lowercase mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuppressionMode::Hard => "hard",
            SuppressionMode::Blend => "blend",
        }
    }
}

impl fmt::Display for SuppressionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuppressionMode {
    type Err = PriorBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hard" => Ok(SuppressionMode::Hard),
            "blend" | "blending" => Ok(SuppressionMode::Blend),
            _ => Err(PriorBoxError::UnknownSuppressionMode(s.to_string())),
        }
    }
}

/// Numeric mode codes used by UltraFace deployments: `1` hard, `2` blend.
impl TryFrom<i32> for SuppressionMode {
    type Error = PriorBoxError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SuppressionMode::Hard),
            2 => Ok(SuppressionMode::Blend),
            other => Err(PriorBoxError::UnknownSuppressionMode(other.to_string())),
        }
    }
}

/// Suppression parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SuppressConfig {
    /// Candidates join a cluster when their IoU with its seed exceeds this.
    pub iou_threshold: f32,
    /// Cluster reduction rule.
    pub mode: SuppressionMode,
    /// Keep at most this many detections (strongest first); `None` keeps all.
    pub top_k: Option<usize>,
}

impl Default for SuppressConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            mode: SuppressionMode::Hard,
            top_k: None,
        }
    }
}

impl SuppressConfig {
    /// Validates the IoU threshold.
    pub fn validate(&self) -> PriorBoxResult<()> {
        check_unit_interval("iou_threshold", self.iou_threshold)
    }
}

/// Suppressor bound to a validated configuration.
#[derive(Clone, Copy, Debug)]
pub struct Suppressor {
    cfg: SuppressConfig,
}

impl Suppressor {
    /// Creates a suppressor, rejecting invalid configurations.
    pub fn new(cfg: SuppressConfig) -> PriorBoxResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the suppression configuration.
    pub fn config(&self) -> &SuppressConfig {
        &self.cfg
    }

    /// Collapses overlapping candidates, one detection per cluster.
    ///
    /// Detections are ordered by the score of their cluster seed, highest
    /// first. Empty input yields empty output.
    pub fn suppress(&self, candidates: &[DetectionCandidate]) -> Vec<Detection> {
        let _span = trace_span!(
            "suppress",
            candidates = candidates.len(),
            mode = self.cfg.mode.as_str()
        )
        .entered();

        let mut clusters = cluster::greedy_clusters(candidates, self.cfg.iou_threshold);
        if let Some(k) = self.cfg.top_k {
            clusters.truncate(k);
        }
        let out: Vec<Detection> = clusters
            .iter()
            .map(|members| match self.cfg.mode {
                SuppressionMode::Hard => candidates[members[0]],
                SuppressionMode::Blend => blend(candidates, members),
            })
            .collect();

        trace_event!("detections_kept", count = out.len(), clusters = clusters.len());
        out
    }
}

/// Suppresses `candidates` with the given IoU threshold and mode.
pub fn suppress(
    candidates: &[DetectionCandidate],
    iou_threshold: f32,
    mode: SuppressionMode,
) -> PriorBoxResult<Vec<Detection>> {
    let suppressor = Suppressor::new(SuppressConfig {
        iou_threshold,
        mode,
        top_k: None,
    })?;
    Ok(suppressor.suppress(candidates))
}

/// Confidence-weighted average of a cluster.
///
/// Each member weighs `exp(score) / sum(exp(score))`; the box edges, sizes
/// and the score are all averaged with the same weights.
fn blend(candidates: &[Detection], members: &[usize]) -> Detection {
    let scores: Vec<f32> = members.iter().map(|&i| candidates[i].score).collect();
    let weights = exp_weights(&scores);

    let mut rect = Rect::default();
    let mut score = 0.0f32;
    for (&i, &w) in members.iter().zip(&weights) {
        let m = &candidates[i];
        rect.x += w * m.bbox.x;
        rect.y += w * m.bbox.y;
        rect.width += w * m.bbox.width;
        rect.height += w * m.bbox.height;
        score += w * m.score;
    }
    Detection::new(rect, score)
}
