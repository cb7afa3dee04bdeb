//! Error types for priorbox.

use thiserror::Error;

/// Result alias for priorbox operations.
pub type PriorBoxResult<T> = std::result::Result<T, PriorBoxError>;

/// Coarse classification of a [`PriorBoxError`].
///
/// Configuration errors are raised while validating setup parameters and
/// invalidate that configuration. Shape mismatches are raised per frame and
/// only invalidate the frame that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid setup parameters.
    Configuration,
    /// Tensor shapes disagree with the prior set.
    ShapeMismatch,
}

/// Errors that can occur when generating priors or post-processing a frame.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PriorBoxError {
    /// The configuration is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// A threshold lies outside the closed unit interval.
    #[error("{name} must be in [0, 1], got {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// The stride list and the min box list describe different level counts.
    #[error("pyramid level mismatch: {strides} strides vs {min_boxes} min box levels")]
    LevelCountMismatch { strides: usize, min_boxes: usize },
    /// The suppression mode name or code is not recognized.
    #[error("unknown suppression mode: {0}")]
    UnknownSuppressionMode(String),
    /// A tensor has a different row count than expected.
    #[error("{tensor} tensor shape mismatch: expected {expected} rows, got {got}")]
    ShapeMismatch {
        tensor: &'static str,
        expected: usize,
        got: usize,
    },
    /// A tensor has a different column count than its layout requires.
    #[error("{tensor} tensor shape mismatch: expected {expected} columns, got {got}")]
    ColumnMismatch {
        tensor: &'static str,
        expected: usize,
        got: usize,
    },
    /// A tensor buffer cannot be viewed as rows of the requested width.
    #[error("{tensor} tensor has {len} values, cannot view as rows of {cols} columns")]
    TensorLength {
        tensor: &'static str,
        len: usize,
        cols: usize,
    },
}

impl PriorBoxError {
    /// Returns the error class used to decide whether a frame or the whole
    /// configuration is affected.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PriorBoxError::InvalidConfig(_)
            | PriorBoxError::InvalidThreshold { .. }
            | PriorBoxError::LevelCountMismatch { .. }
            | PriorBoxError::UnknownSuppressionMode(_) => ErrorKind::Configuration,
            PriorBoxError::ShapeMismatch { .. }
            | PriorBoxError::ColumnMismatch { .. }
            | PriorBoxError::TensorLength { .. } => ErrorKind::ShapeMismatch,
        }
    }

    /// Returns true for errors raised while validating setup parameters.
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Returns true for per-frame tensor shape errors.
    pub fn is_shape_mismatch(&self) -> bool {
        self.kind() == ErrorKind::ShapeMismatch
    }
}

/// Checks that a threshold lies in [0, 1].
pub(crate) fn check_unit_interval(name: &'static str, value: f32) -> PriorBoxResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PriorBoxError::InvalidThreshold { name, value })
    }
}
