//! Center-in-polygon cell selection.
//!
//! A cell is inside a region when its center lies strictly inside the
//! region polygon. Centers exactly on the boundary are outside. Edge cells
//! are never area-weighted.

use abundance_trends_abundance_models::{AbundanceGrid, GridGeometry};
use geo::BoundingRect;

use crate::Region;

/// Cells of one grid geometry that belong to a region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    geometry: GridGeometry,
    cells: Vec<bool>,
    count: usize,
}

impl RegionMask {
    /// Selects the cells of `geometry` whose centers lie inside `region`.
    ///
    /// A geometry whose cell count overflows `usize` yields an empty mask.
    #[must_use]
    pub fn new(region: &Region, geometry: &GridGeometry) -> Self {
        let bounds = region.polygon.bounding_rect();

        let cells: Vec<bool> = (0..geometry.cell_count().unwrap_or(0))
            .map(|index| {
                let (x, y) = geometry.cell_center(index);
                bounds.is_some_and(|r| {
                    x > r.min().x && x < r.max().x && y > r.min().y && y < r.max().y
                }) && region.contains_point(x, y)
            })
            .collect();

        let count = cells.iter().filter(|&&c| c).count();

        log::debug!(
            "Region {} covers {count} of {} cells",
            region.name,
            cells.len()
        );

        Self {
            geometry: *geometry,
            cells,
            count,
        }
    }

    /// Geometry the mask was built for.
    #[must_use]
    pub const fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Whether the cell at row-major `index` is inside the region.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.cells.get(index).copied().unwrap_or(false)
    }

    /// Number of cells inside the region.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Row-major indices of the cells inside the region.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, &inside)| inside.then_some(i))
    }

    /// Sum of `grid`'s data cells inside the region, in row-major order.
    ///
    /// Iterates in the same order as [`AbundanceGrid::total_sum`], so for
    /// non-negative data the result never exceeds the total and a mask
    /// covering every cell reproduces it exactly.
    #[must_use]
    pub fn sum(&self, grid: &AbundanceGrid) -> f64 {
        grid.data_cells()
            .filter(|(i, _)| self.contains(*i))
            .fold(0.0, |acc, (_, v)| acc + v)
    }

    /// Copy of `grid` with every cell outside the region set to no data.
    #[must_use]
    pub fn apply(&self, grid: &AbundanceGrid) -> AbundanceGrid {
        let values = grid
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| if self.contains(i) { v } else { f64::NAN })
            .collect();
        AbundanceGrid::new(grid.geometry, values, grid.no_data)
    }
}
