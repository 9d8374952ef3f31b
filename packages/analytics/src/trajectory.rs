//! Population-trajectory aggregation.
//!
//! For every week of a species' stack the aggregator sums the abundance of
//! the cells inside the region (center-in-polygon, see
//! [`RegionMask`]) and of all cells, both skipping no-data cells, and
//! divides the two. A zero total yields [`Proportion::Undefined`].
//!
//! Weeks are independent. In parallel mode each `(week_index, grid)` pair
//! is a rayon task and results are collected by index, so the returned
//! records are in stack order whatever the completion order was.

use abundance_trends_abundance_models::{AbundanceGrid, AbundanceStack, ExecutionMode, GridGeometry};
use abundance_trends_analytics_models::{Proportion, TrajectoryRecord};
use abundance_trends_spatial::{Region, RegionMask};
use chrono::NaiveDate;
use rayon::prelude::*;
use thiserror::Error;

/// Region and range-wide sums for one week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekSums {
    /// Sum of data cells inside the region.
    pub region_sum: f64,
    /// Sum of all data cells.
    pub total_sum: f64,
}

impl WeekSums {
    /// The week's proportion.
    #[must_use]
    pub fn proportion(self) -> Proportion {
        Proportion::from_sums(self.region_sum, self.total_sum)
    }
}

/// Why a single week could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeekFailureKind {
    /// The grid's geometry differs from the stack's first week.
    #[error("grid geometry {found:?} differs from the first week's {expected:?}")]
    GeometryMismatch {
        /// Geometry of the first week.
        expected: GridGeometry,
        /// Geometry of this week.
        found: GridGeometry,
    },

    /// The geometry's cell count does not fit in `usize`.
    #[error("grid of {width}x{height} cells is too large to address")]
    GeometryOverflow {
        /// Columns.
        width: usize,
        /// Rows.
        height: usize,
    },

    /// The value count does not match the geometry.
    #[error("expected {expected} cell values, found {found}")]
    ValueCount {
        /// Cells implied by the geometry.
        expected: usize,
        /// Values present.
        found: usize,
    },

    /// A data cell is negative or infinite.
    #[error("cell {index} holds invalid abundance {value}")]
    InvalidValue {
        /// Row-major cell index.
        index: usize,
        /// Offending value.
        value: f64,
    },

    /// A sum overflowed to a non-finite value.
    #[error("abundance sums overflow (region {region_sum}, total {total_sum})")]
    SumOverflow {
        /// Sum inside the region.
        region_sum: f64,
        /// Range-wide sum.
        total_sum: f64,
    },

    /// The region sum came out larger than the range-wide sum.
    ///
    /// Row-major summation of validated non-negative cells keeps the
    /// region sum at or below the total, so this signals a broken
    /// invariant rather than bad input.
    #[error("region sum {region_sum} exceeds total sum {total_sum}")]
    RegionExceedsTotal {
        /// Sum inside the region.
        region_sum: f64,
        /// Range-wide sum.
        total_sum: f64,
    },
}

/// A week that failed, with enough context to find it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("week {week} ({date}): {kind}")]
pub struct WeekFailure {
    /// Zero-based position in the stack.
    pub week: usize,
    /// Week midpoint.
    pub date: NaiveDate,
    /// What went wrong.
    pub kind: WeekFailureKind,
}

/// Structural failure of one species' trajectory.
///
/// None of these are retried: they mean the caller handed over data that
/// breaks the aggregator's contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// The region was not reprojected into the raster's CRS.
    #[error("{species}: raster CRS {raster_crs} does not match region CRS {region_crs}")]
    CrsMismatch {
        /// Species common name.
        species: String,
        /// CRS of the stack.
        raster_crs: String,
        /// CRS of the region.
        region_crs: String,
    },

    /// Week dates are not strictly increasing.
    #[error("{species}: week {week} ({date}) does not follow week dated {previous}")]
    UnorderedWeeks {
        /// Species common name.
        species: String,
        /// Zero-based position of the out-of-order week.
        week: usize,
        /// Its date.
        date: NaiveDate,
        /// Date of the week before it.
        previous: NaiveDate,
    },

    /// One or more weeks failed.
    #[error("{species}: {count} week(s) failed, first {first}", count = .failures.len(), first = first_failure(.failures))]
    Weeks {
        /// Species common name.
        species: String,
        /// Failed weeks in stack order.
        failures: Vec<WeekFailure>,
    },

    /// The species name already appeared earlier in the batch.
    #[error("{species}: duplicate species in batch")]
    DuplicateSpecies {
        /// Species common name.
        species: String,
    },
}

impl TrajectoryError {
    /// The species this failure belongs to.
    #[must_use]
    pub fn species(&self) -> &str {
        match self {
            Self::CrsMismatch { species, .. }
            | Self::UnorderedWeeks { species, .. }
            | Self::Weeks { species, .. }
            | Self::DuplicateSpecies { species } => species,
        }
    }
}

fn first_failure(failures: &[WeekFailure]) -> String {
    failures
        .first()
        .map_or_else(String::new, ToString::to_string)
}

/// Computes one [`TrajectoryRecord`] per week of `stack`.
///
/// An empty stack yields an empty trajectory. Stacks with other than 52
/// weeks are processed as given.
///
/// # Errors
///
/// Returns [`TrajectoryError`] if the CRS differs from the region's, the
/// week dates are out of order, or any week's grid is malformed. No
/// partial trajectory is returned in that case.
pub fn compute_trajectory(
    stack: &AbundanceStack,
    region: &Region,
    mode: ExecutionMode,
) -> Result<Vec<TrajectoryRecord>, TrajectoryError> {
    let sums = compute_week_sums(stack, region, mode)?;

    Ok(stack
        .weeks
        .iter()
        .zip(sums)
        .map(|(week, sums)| TrajectoryRecord {
            species: stack.species.clone(),
            date: week.date,
            proportion: sums.proportion(),
        })
        .collect())
}

/// Computes region and total sums for every week of `stack`, in stack
/// order.
///
/// # Errors
///
/// Same conditions as [`compute_trajectory`].
pub fn compute_week_sums(
    stack: &AbundanceStack,
    region: &Region,
    mode: ExecutionMode,
) -> Result<Vec<WeekSums>, TrajectoryError> {
    if stack.crs != region.crs {
        return Err(TrajectoryError::CrsMismatch {
            species: stack.species.clone(),
            raster_crs: stack.crs.clone(),
            region_crs: region.crs.clone(),
        });
    }

    let Some(first) = stack.weeks.first() else {
        log::debug!("{}: empty stack, nothing to aggregate", stack.species);
        return Ok(Vec::new());
    };

    check_chronology(stack)?;

    let geometry = first.grid.geometry;

    // Every week must match its values before the mask is sized from the
    // geometry.
    collect_weeks(
        stack,
        run_weeks(stack, mode, |grid| validate_week(grid, &geometry)),
    )?;

    let mask = RegionMask::new(region, &geometry);
    let sums = collect_weeks(stack, run_weeks(stack, mode, |grid| week_sums(grid, &mask)))?;

    log::debug!(
        "{}: aggregated {} weeks over {} region cells",
        stack.species,
        sums.len(),
        mask.count()
    );

    Ok(sums)
}

fn check_chronology(stack: &AbundanceStack) -> Result<(), TrajectoryError> {
    for (i, pair) in stack.weeks.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(TrajectoryError::UnorderedWeeks {
                species: stack.species.clone(),
                week: i + 1,
                date: pair[1].date,
                previous: pair[0].date,
            });
        }
    }
    Ok(())
}

/// Applies `f` to every week's grid, keyed by week index.
fn run_weeks<T, F>(
    stack: &AbundanceStack,
    mode: ExecutionMode,
    f: F,
) -> Vec<(usize, Result<T, WeekFailureKind>)>
where
    T: Send,
    F: Fn(&AbundanceGrid) -> Result<T, WeekFailureKind> + Sync + Send,
{
    if mode.is_parallel() {
        stack
            .weeks
            .par_iter()
            .enumerate()
            .map(|(i, week)| (i, f(&week.grid)))
            .collect()
    } else {
        stack
            .weeks
            .iter()
            .enumerate()
            .map(|(i, week)| (i, f(&week.grid)))
            .collect()
    }
}

/// Reassembles per-week results in stack order, or reports every failed
/// week.
fn collect_weeks<T>(
    stack: &AbundanceStack,
    results: Vec<(usize, Result<T, WeekFailureKind>)>,
) -> Result<Vec<T>, TrajectoryError> {
    let mut values: Vec<Option<T>> = std::iter::repeat_with(|| None)
        .take(stack.weeks.len())
        .collect();
    let mut failures = Vec::new();

    for (week, result) in results {
        match result {
            Ok(v) => values[week] = Some(v),
            Err(kind) => failures.push(WeekFailure {
                week,
                date: stack.weeks[week].date,
                kind,
            }),
        }
    }

    if failures.is_empty() {
        Ok(values.into_iter().flatten().collect())
    } else {
        failures.sort_by_key(|f| f.week);
        Err(TrajectoryError::Weeks {
            species: stack.species.clone(),
            failures,
        })
    }
}

fn validate_week(grid: &AbundanceGrid, geometry: &GridGeometry) -> Result<(), WeekFailureKind> {
    if grid.geometry != *geometry {
        return Err(WeekFailureKind::GeometryMismatch {
            expected: *geometry,
            found: grid.geometry,
        });
    }

    let Some(expected) = geometry.cell_count() else {
        return Err(WeekFailureKind::GeometryOverflow {
            width: geometry.width,
            height: geometry.height,
        });
    };

    if grid.values.len() != expected {
        return Err(WeekFailureKind::ValueCount {
            expected,
            found: grid.values.len(),
        });
    }

    if let Some((index, value)) = grid
        .data_cells()
        .find(|(_, v)| *v < 0.0 || v.is_infinite())
    {
        return Err(WeekFailureKind::InvalidValue { index, value });
    }

    Ok(())
}

fn week_sums(grid: &AbundanceGrid, mask: &RegionMask) -> Result<WeekSums, WeekFailureKind> {
    check_sums(mask.sum(grid), grid.total_sum())
}

fn check_sums(region_sum: f64, total_sum: f64) -> Result<WeekSums, WeekFailureKind> {
    if !region_sum.is_finite() || !total_sum.is_finite() {
        return Err(WeekFailureKind::SumOverflow {
            region_sum,
            total_sum,
        });
    }

    if region_sum > total_sum {
        return Err(WeekFailureKind::RegionExceedsTotal {
            region_sum,
            total_sum,
        });
    }

    Ok(WeekSums {
        region_sum,
        total_sum,
    })
}
