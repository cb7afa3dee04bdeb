//! Detection records and candidate ordering.

pub(crate) mod order;
mod rect;

pub use rect::Rect;

/// A scored box in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Detection {
    /// Bounding box in frame pixels.
    pub bbox: Rect,
    /// Foreground confidence in [0, 1].
    pub score: f32,
}

/// Per-anchor decoder output awaiting suppression.
pub type DetectionCandidate = Detection;

impl Detection {
    /// Creates a detection from a box and a score.
    pub fn new(bbox: Rect, score: f32) -> Self {
        Self { bbox, score }
    }
}
