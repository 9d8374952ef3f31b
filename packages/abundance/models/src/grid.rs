//! Grid geometry and single-layer abundance grids.
//!
//! Grids are north-up and row-major: row 0 is the northern edge and
//! columns increase eastward. Coordinates are in whatever projected CRS
//! the owning stack declares.

use serde::{Deserialize, Serialize};

/// Affine placement of a north-up grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridTransform {
    /// X coordinate of the top-left corner.
    pub origin_x: f64,
    /// Y coordinate of the top-left corner.
    pub origin_y: f64,
    /// Cell size along X.
    pub cell_width: f64,
    /// Cell size along Y (positive; rows advance southward).
    pub cell_height: f64,
}

/// Dimensions and placement of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridGeometry {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
    /// Placement of the top-left corner and cell size.
    pub transform: GridTransform,
}

impl GridGeometry {
    /// Total number of cells, or `None` if it does not fit in `usize`.
    #[must_use]
    pub const fn cell_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// Returns the center of the cell at row-major `index`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn cell_center(&self, index: usize) -> (f64, f64) {
        let col = index % self.width;
        let row = index / self.width;
        let t = &self.transform;
        (
            (col as f64 + 0.5).mul_add(t.cell_width, t.origin_x),
            (row as f64 + 0.5).mul_add(-t.cell_height, t.origin_y),
        )
    }

    /// Returns the row-major index of the cell containing `(x, y)`.
    ///
    /// Cells are half-open: the west and north edges belong to the cell,
    /// the east and south edges belong to the neighbour.
    #[must_use]
    pub fn cell_at(&self, x: f64, y: f64) -> Option<usize> {
        let t = &self.transform;
        let col = ((x - t.origin_x) / t.cell_width).floor();
        let row = ((t.origin_y - y) / t.cell_height).floor();

        // Also rejects NaN.
        if !(col >= 0.0 && row >= 0.0) {
            return None;
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (col, row) = (col as usize, row as usize);

        if col >= self.width || row >= self.height {
            return None;
        }

        row.checked_mul(self.width)?.checked_add(col)
    }
}

/// One layer of relative-abundance values.
///
/// A cell holds no data when its value is NaN or equals the `no_data`
/// sentinel. No-data cells never contribute to sums.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceGrid {
    /// Shape and placement.
    pub geometry: GridGeometry,
    /// Cell values in row-major order.
    pub values: Vec<f64>,
    /// Optional sentinel marking missing cells, in addition to NaN.
    pub no_data: Option<f64>,
}

impl AbundanceGrid {
    /// Creates a grid. The value count is not checked here; consumers
    /// validate it against the geometry.
    #[must_use]
    pub const fn new(geometry: GridGeometry, values: Vec<f64>, no_data: Option<f64>) -> Self {
        Self {
            geometry,
            values,
            no_data,
        }
    }

    /// Whether `value` is a no-data marker for this grid.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_no_data(&self, value: f64) -> bool {
        value.is_nan() || self.no_data.is_some_and(|nd| value == nd)
    }

    /// Whether the value count matches the geometry.
    #[must_use]
    pub fn has_consistent_len(&self) -> bool {
        self.geometry.cell_count() == Some(self.values.len())
    }

    /// Value at row-major `index`, or `None` when out of range or no data.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .copied()
            .filter(|v| !self.is_no_data(*v))
    }

    /// Value of the cell containing `(x, y)`.
    #[must_use]
    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        self.geometry.cell_at(x, y).and_then(|i| self.value(i))
    }

    /// Iterates `(index, value)` over data cells in row-major order.
    pub fn data_cells(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| !self.is_no_data(*v))
    }

    /// Sum of all data cells, in row-major order.
    #[must_use]
    pub fn total_sum(&self) -> f64 {
        self.data_cells().fold(0.0, |acc, (_, v)| acc + v)
    }
}
