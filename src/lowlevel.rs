//! Low-level building blocks for custom post-processing pipelines.
//!
//! Most users should prefer [`Detector`](crate::Detector); these re-exports
//! cover callers that run their own decode loop or share one prior set
//! between several models.

pub use crate::anchor::FeatureGrid;
pub use crate::decode::scalar::decode_box;
pub use crate::decode::{CENTER_VARIANCE, SIZE_VARIANCE};
pub use crate::tensor::{OFFSET_COLS, SCORE_COLS};
