//! Weekly abundance stacks and their JSON file representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grid::{AbundanceGrid, GridGeometry};

/// Number of weekly layers in a full reference year.
pub const WEEKS_PER_YEAR: usize = 52;

/// One week of modeled abundance, dated at the week's midpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyGrid {
    /// Week midpoint.
    pub date: NaiveDate,
    /// Abundance values for the week.
    pub grid: AbundanceGrid,
}

/// A species' weekly abundance layers for one reference year.
///
/// Weeks are expected in chronological order with distinct dates. A full
/// stack has [`WEEKS_PER_YEAR`] layers, but shorter stacks are valid
/// inputs and are processed week by week.
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceStack {
    /// Species common name (unique within a run).
    pub species: String,
    /// Coordinate reference system identifier (e.g. `"EPSG:8857"`).
    pub crs: String,
    /// Weekly layers.
    pub weeks: Vec<WeeklyGrid>,
}

impl AbundanceStack {
    /// Number of weekly layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    /// Whether the stack has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Whether the stack covers a full reference year.
    #[must_use]
    pub fn is_full_year(&self) -> bool {
        self.weeks.len() == WEEKS_PER_YEAR
    }

    /// Week dates in stack order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks.iter().map(|w| w.date)
    }
}

/// JSON layout of a weekly stack file.
///
/// `null` cell values are no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFile {
    /// Species common name.
    pub species: String,
    /// Coordinate reference system identifier.
    pub crs: String,
    /// Geometry shared by every week.
    pub geometry: GridGeometry,
    /// Optional no-data sentinel used by numeric cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_data: Option<f64>,
    /// Weekly layers.
    pub weeks: Vec<WeekLayerFile>,
}

/// One week inside a [`StackFile`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekLayerFile {
    /// Week midpoint (`YYYY-MM-DD`).
    pub date: NaiveDate,
    /// Row-major cell values.
    pub values: Vec<Option<f64>>,
}

impl From<StackFile> for AbundanceStack {
    fn from(file: StackFile) -> Self {
        let StackFile {
            species,
            crs,
            geometry,
            no_data,
            weeks,
        } = file;

        let weeks = weeks
            .into_iter()
            .map(|week| WeeklyGrid {
                date: week.date,
                grid: AbundanceGrid::new(geometry, decode_values(week.values), no_data),
            })
            .collect();

        Self {
            species,
            crs,
            weeks,
        }
    }
}

/// JSON layout of a single grid (seasonal or uncertainty layers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridFile {
    /// Coordinate reference system identifier.
    pub crs: String,
    /// Grid geometry.
    pub geometry: GridGeometry,
    /// Optional no-data sentinel used by numeric cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_data: Option<f64>,
    /// Row-major cell values.
    pub values: Vec<Option<f64>>,
}

impl GridFile {
    /// Converts into an in-memory grid, returning it with its CRS.
    #[must_use]
    pub fn into_grid(self) -> (String, AbundanceGrid) {
        let grid = AbundanceGrid::new(self.geometry, decode_values(self.values), self.no_data);
        (self.crs, grid)
    }

    /// Builds the file form of `grid`. No-data cells become `null`.
    #[must_use]
    pub fn from_grid(crs: &str, grid: &AbundanceGrid) -> Self {
        Self {
            crs: crs.to_string(),
            geometry: grid.geometry,
            no_data: None,
            values: grid
                .values
                .iter()
                .map(|v| (!grid.is_no_data(*v)).then_some(*v))
                .collect(),
        }
    }
}

fn decode_values(values: Vec<Option<f64>>) -> Vec<f64> {
    values
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect()
}
