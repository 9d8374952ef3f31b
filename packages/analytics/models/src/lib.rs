#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types produced by the abundance analytics.
//!
//! Trajectory and richness records are the tidy tables downstream plots
//! and the CSV cache consume. Site selections and point estimates back
//! the quantile and confidence-interval analyses.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Share of a species' range-wide abundance that falls inside a region.
///
/// `Undefined` means the species had no modeled abundance anywhere that
/// week (total-sum of zero). It is distinct from `Defined(0.0)`, which
/// means abundance exists but none of it is inside the region.
///
/// Serializes as an optional number: `Undefined` is `null` in JSON and an
/// empty field in CSV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Proportion {
    /// A finite ratio.
    Defined(f64),
    /// Total-sum was zero.
    Undefined,
}

impl Proportion {
    /// Divides `region_sum` by `total_sum`, yielding `Undefined` when the
    /// total is zero or the ratio is not finite.
    #[must_use]
    pub fn from_sums(region_sum: f64, total_sum: f64) -> Self {
        if total_sum == 0.0 {
            Self::Undefined
        } else {
            Some(region_sum / total_sum).into()
        }
    }

    /// The ratio, if defined.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }

    /// Whether this is the undefined marker.
    #[must_use]
    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether the species counts as present: defined and non-zero.
    #[must_use]
    pub fn is_present(self) -> bool {
        matches!(self, Self::Defined(v) if v != 0.0)
    }
}

impl From<Option<f64>> for Proportion {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Defined(v),
            _ => Self::Undefined,
        }
    }
}

impl Serialize for Proportion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Proportion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<f64>::deserialize(deserializer).map(Self::from)
    }
}

/// One week of one species' population trajectory.
///
/// Unique by `(species, date)` within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    /// Species common name.
    pub species: String,
    /// Week midpoint.
    pub date: NaiveDate,
    /// Share of the week's abundance inside the region.
    pub proportion: Proportion,
}

/// Number of species present in the region on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichnessRecord {
    /// Week midpoint.
    pub date: NaiveDate,
    /// Distinct species with a defined, non-zero proportion.
    pub count: u32,
}

/// A week whose proportion came out undefined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndefinedWeek {
    /// Species common name.
    pub species: String,
    /// Zero-based position in the species' stack.
    pub week: usize,
    /// Week midpoint.
    pub date: NaiveDate,
}

/// A grid cell picked by quantile site selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCell {
    /// Row-major cell index.
    pub index: usize,
    /// Cell center X.
    pub x: f64,
    /// Cell center Y.
    pub y: f64,
    /// Abundance value.
    pub value: f64,
}

/// Cells at or above an abundance quantile within a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSelection {
    /// Requested quantile in `[0, 1]`.
    pub quantile: f64,
    /// Abundance value at the quantile.
    pub threshold: f64,
    /// Data cells considered (inside the region, not no-data).
    pub candidate_count: usize,
    /// Selected cells, highest value first.
    pub cells: Vec<SelectedCell>,
}

/// A named location to extract values at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Caller-supplied identifier.
    pub id: String,
    /// X coordinate in the grid CRS.
    pub x: f64,
    /// Y coordinate in the grid CRS.
    pub y: f64,
}

/// Abundance with its confidence interval at a site.
///
/// Each bound is `None` when the site is off the grid or on a no-data
/// cell of that layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    /// Site identifier.
    pub id: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Median (point) estimate.
    pub median: Option<f64>,
    /// Lower confidence bound.
    pub lower: Option<f64>,
    /// Upper confidence bound.
    pub upper: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_is_undefined() {
        assert_eq!(Proportion::from_sums(0.0, 0.0), Proportion::Undefined);
        assert_eq!(Proportion::from_sums(3.0, 0.0), Proportion::Undefined);
        assert_eq!(Proportion::from_sums(0.0, 4.0), Proportion::Defined(0.0));
        assert_eq!(Proportion::from_sums(1.0, 4.0), Proportion::Defined(0.25));
    }

    #[test]
    fn presence_requires_defined_non_zero() {
        assert!(Proportion::Defined(0.1).is_present());
        assert!(!Proportion::Defined(0.0).is_present());
        assert!(!Proportion::Undefined.is_present());
        assert!(Proportion::Undefined.is_undefined());
    }

    #[test]
    fn non_finite_ratio_is_never_defined() {
        let inf = f64::INFINITY;
        assert_eq!(Proportion::from_sums(inf, inf), Proportion::Undefined);
        assert_eq!(Proportion::from_sums(f64::NAN, 1.0), Proportion::Undefined);
        assert_eq!(Proportion::from_sums(f64::MAX, 0.5), Proportion::Undefined);
    }

    #[test]
    fn nan_reads_as_undefined() {
        assert_eq!(Proportion::from(Some(f64::NAN)), Proportion::Undefined);
        assert_eq!(Proportion::from(Some(f64::INFINITY)), Proportion::Undefined);
        assert_eq!(Proportion::from(None), Proportion::Undefined);
        assert_eq!(Proportion::from(Some(0.5)), Proportion::Defined(0.5));
    }

    #[test]
    fn proportion_serializes_as_optional_number() {
        let record = TrajectoryRecord {
            species: "Wood Thrush".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 3, 1).unwrap(),
            proportion: Proportion::Undefined,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"species":"Wood Thrush","date":"2022-03-01","proportion":null}"#
        );

        let parsed: TrajectoryRecord =
            serde_json::from_str(r#"{"species":"A","date":"2022-03-01","proportion":0.25}"#)
                .unwrap();
        assert_eq!(parsed.proportion, Proportion::Defined(0.25));
    }
}
