#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analyses over weekly relative-abundance stacks.
//!
//! The centrepiece is the population-trajectory aggregator: for each week,
//! the share of a species' range-wide abundance that lies inside a target
//! region. Trajectories of several species collapse into a weekly richness
//! count. Seasonal means, quantile site selection, and point confidence
//! intervals cover the remaining exploratory analyses.
//!
//! All functions are pure over in-memory grids. Independent weeks and
//! species fan out over rayon when [`ExecutionMode::Parallel`] is
//! requested; output order never depends on scheduling.

pub mod batch;
pub mod extract;
pub mod progress;
pub mod richness;
pub mod season;
pub mod sites;
pub mod trajectory;

pub use abundance_trends_abundance_models::ExecutionMode;
pub use batch::{BatchReport, compute_batch};
pub use extract::extract_intervals;
pub use richness::compute_richness;
pub use season::{Season, seasonal_mean};
pub use sites::select_sites;
pub use trajectory::{
    TrajectoryError, WeekFailure, WeekFailureKind, WeekSums, compute_trajectory,
    compute_week_sums,
};

use thiserror::Error;

/// Errors from the seasonal, site-selection, and extraction analyses.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Two grids that must line up do not share a geometry.
    #[error("Grid geometry mismatch: {message}")]
    GeometryMismatch {
        /// Which grids disagree.
        message: String,
    },

    /// Raster and region are in different coordinate reference systems.
    #[error("CRS mismatch: raster is {raster_crs}, region is {region_crs}")]
    CrsMismatch {
        /// CRS of the raster.
        raster_crs: String,
        /// CRS of the region polygon.
        region_crs: String,
    },

    /// A season bound is not a valid `MM-DD` day.
    #[error("Invalid season bound '{value}': expected MM-DD")]
    InvalidSeasonBound {
        /// The rejected bound.
        value: String,
    },

    /// No week of the stack falls inside the season.
    #[error("Season {season} selects no weeks of {species}")]
    EmptySeason {
        /// Season name.
        season: String,
        /// Species common name.
        species: String,
    },

    /// Quantile outside `[0, 1]`.
    #[error("Quantile {quantile} out of range [0, 1]")]
    InvalidQuantile {
        /// The rejected quantile.
        quantile: f64,
    },

    /// The region holds no data cells to select from.
    #[error("Region contains no data cells")]
    NoCandidateCells,
}

/// Fails unless the raster and region CRS identifiers match.
///
/// # Errors
///
/// Returns [`AnalyticsError::CrsMismatch`] when they differ.
pub fn ensure_same_crs(raster_crs: &str, region_crs: &str) -> Result<(), AnalyticsError> {
    if raster_crs == region_crs {
        Ok(())
    } else {
        Err(AnalyticsError::CrsMismatch {
            raster_crs: raster_crs.to_string(),
            region_crs: region_crs.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use abundance_trends_abundance_models::{
        AbundanceGrid, AbundanceStack, GridGeometry, GridTransform, WeeklyGrid,
    };
    use abundance_trends_spatial::Region;
    use chrono::NaiveDate;
    use geo::{MultiPolygon, polygon};

    pub const CRS: &str = "EPSG:8857";

    /// Unit-cell grid of `width` x `height` with its top-left at
    /// `(0, height)`.
    pub fn geometry(width: usize, height: usize) -> GridGeometry {
        #[allow(clippy::cast_precision_loss)]
        let origin_y = height as f64;
        GridGeometry {
            width,
            height,
            transform: GridTransform {
                origin_x: 0.0,
                origin_y,
                cell_width: 1.0,
                cell_height: 1.0,
            },
        }
    }

    /// Weekly dates starting 2022-01-04, seven days apart.
    pub fn week_date(week: usize) -> NaiveDate {
        let start = NaiveDate::from_ymd_opt(2022, 1, 4).unwrap();
        start + chrono::Duration::days(7 * i64::try_from(week).unwrap())
    }

    /// Stack whose week `i` holds `weeks[i]` on a `width` x `height` grid.
    pub fn stack(species: &str, width: usize, height: usize, weeks: &[Vec<f64>]) -> AbundanceStack {
        AbundanceStack {
            species: species.to_string(),
            crs: CRS.to_string(),
            weeks: weeks
                .iter()
                .enumerate()
                .map(|(i, values)| WeeklyGrid {
                    date: week_date(i),
                    grid: AbundanceGrid::new(geometry(width, height), values.clone(), None),
                })
                .collect(),
        }
    }

    /// Axis-aligned rectangular region.
    pub fn region(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Region {
        Region::new(
            "Test",
            CRS,
            MultiPolygon(vec![polygon![
                (x: min_x, y: min_y),
                (x: max_x, y: min_y),
                (x: max_x, y: max_y),
                (x: min_x, y: max_y),
                (x: min_x, y: min_y),
            ]]),
        )
    }
}
