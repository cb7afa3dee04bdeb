//! priorbox turns raw SSD-style detector outputs into deduplicated boxes.
//!
//! The pipeline has three stages:
//!
//! 1. [`PriorSet::generate`] lays out the anchor priors for a model input
//!    resolution and feature pyramid (once, at setup).
//! 2. [`BoxDecoder`] decodes per-anchor offsets against the priors and keeps
//!    anchors whose foreground score clears a threshold (per frame).
//! 3. [`Suppressor`] clusters overlapping candidates greedily and keeps the
//!    strongest box or a confidence-weighted blend per cluster (per frame).
//!
//! [`Detector`] wires the stages together. Decoding can optionally run on
//! the rayon pool via the `rayon` feature; the `tracing` feature emits spans
//! and diagnostics.
//!
//! ```
//! use priorbox::{Detector, DetectorConfig, FrameSize};
//!
//! let detector = Detector::new(DetectorConfig::default()).unwrap();
//! let n = detector.num_anchors();
//! let offsets = vec![0.0f32; n * 4];
//! let scores = vec![0.0f32; n * 2];
//! let faces = detector.detect(&offsets, &scores, FrameSize::new(640, 480)).unwrap();
//! assert!(faces.is_empty());
//! ```

pub mod anchor;
pub mod candidate;
pub mod decode;
mod detector;
pub mod lowlevel;
pub mod nms;
pub mod tensor;
mod trace;
pub mod util;

pub use anchor::{generate, AnchorConfig, AnchorPrior, PriorSet};
pub use candidate::{Detection, DetectionCandidate, Rect};
pub use decode::{decode, BoxDecoder, DecodeConfig, FrameSize};
pub use detector::{Detector, DetectorConfig};
pub use nms::{suppress, SuppressConfig, SuppressionMode, Suppressor};
pub use tensor::TensorView;
pub use util::{ErrorKind, PriorBoxError, PriorBoxResult};
