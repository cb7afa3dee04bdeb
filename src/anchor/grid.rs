//! Feature-map grid geometry for one pyramid level.

use crate::util::{PriorBoxError, PriorBoxResult};

/// Grid of anchor cells produced by a single feature-map stride.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureGrid {
    stride: f32,
    width: usize,
    height: usize,
    cells: usize,
}

impl FeatureGrid {
    /// Creates the grid covering an `input_width x input_height` input at the
    /// given stride. Partial cells at the border count as full cells.
    pub fn new(input_width: usize, input_height: usize, stride: f32) -> PriorBoxResult<Self> {
        if !stride.is_finite() || stride <= 0.0 {
            return Err(PriorBoxError::InvalidConfig("strides must be finite and > 0"));
        }
        if input_width == 0 || input_height == 0 {
            return Err(PriorBoxError::InvalidConfig("input size must be non-zero"));
        }
        let width = (input_width as f32 / stride).ceil() as usize;
        let height = (input_height as f32 / stride).ceil() as usize;
        let cells = width
            .checked_mul(height)
            .ok_or(PriorBoxError::InvalidConfig("prior count overflows"))?;
        Ok(Self {
            stride,
            width,
            height,
            cells,
        })
    }

    /// Returns the stride in input pixels between adjacent cells.
    pub fn stride(&self) -> f32 {
        self.stride
    }

    /// Returns the number of cell columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of cell rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of cells.
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Returns the normalized center of cell `(i, j)`.
    pub fn cell_center(&self, i: usize, j: usize) -> (f32, f32) {
        (
            (i as f32 + 0.5) / self.width as f32,
            (j as f32 + 0.5) / self.height as f32,
        )
    }
}
