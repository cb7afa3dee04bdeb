//! Borrowed row-major views over raw network output tensors.
//!
//! The inference engine hands back flat `f32` buffers. `TensorView` pairs a
//! buffer with its logical `rows x cols` shape and only hands out rows
//! through bounds-checked accessors, so a short or oversized buffer surfaces
//! as an error instead of an out-of-bounds read.

use crate::util::{PriorBoxError, PriorBoxResult};

/// Columns in a box offset tensor: `dx, dy, dw, dh`.
pub const OFFSET_COLS: usize = 4;
/// Columns in a class score tensor: `background, foreground`.
pub const SCORE_COLS: usize = 2;

/// Borrowed 2D tensor view with contiguous rows.
#[derive(Copy, Clone, Debug)]
pub struct TensorView<'a> {
    data: &'a [f32],
    rows: usize,
    cols: usize,
    name: &'static str,
}

impl<'a> TensorView<'a> {
    /// Creates a view with an explicit shape; the buffer length must equal
    /// `rows * cols` exactly.
    pub fn new(
        name: &'static str,
        data: &'a [f32],
        rows: usize,
        cols: usize,
    ) -> PriorBoxResult<Self> {
        let view = Self::from_flat(name, data, cols)?;
        if view.rows != rows {
            return Err(PriorBoxError::ShapeMismatch {
                tensor: name,
                expected: rows,
                got: view.rows,
            });
        }
        Ok(view)
    }

    /// Creates a view over a flat buffer, inferring the row count.
    pub fn from_flat(name: &'static str, data: &'a [f32], cols: usize) -> PriorBoxResult<Self> {
        if cols == 0 || data.len() % cols != 0 {
            return Err(PriorBoxError::TensorLength {
                tensor: name,
                len: data.len(),
                cols,
            });
        }
        Ok(Self {
            data,
            rows: data.len() / cols,
            cols,
            name,
        })
    }

    /// Views a flat buffer as an `N x 4` box offset tensor.
    pub fn offsets(data: &'a [f32]) -> PriorBoxResult<Self> {
        Self::from_flat("offsets", data, OFFSET_COLS)
    }

    /// Views a flat buffer as an `N x 2` class score tensor.
    pub fn scores(data: &'a [f32]) -> PriorBoxResult<Self> {
        Self::from_flat("scores", data, SCORE_COLS)
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the tensor name used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns row `i`, or `None` past the last row.
    pub fn row(&self, i: usize) -> Option<&'a [f32]> {
        if i >= self.rows {
            return None;
        }
        let start = i.checked_mul(self.cols)?;
        let end = start.checked_add(self.cols)?;
        self.data.get(start..end)
    }

    /// Iterates over all rows in order.
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'a, f32> {
        self.data.chunks_exact(self.cols)
    }

    /// Fails unless the view has exactly `rows` rows and `cols` columns.
    pub fn expect_shape(&self, rows: usize, cols: usize) -> PriorBoxResult<()> {
        if self.cols != cols {
            return Err(PriorBoxError::ColumnMismatch {
                tensor: self.name,
                expected: cols,
                got: self.cols,
            });
        }
        if self.rows != rows {
            return Err(PriorBoxError::ShapeMismatch {
                tensor: self.name,
                expected: rows,
                got: self.rows,
            });
        }
        Ok(())
    }
}
