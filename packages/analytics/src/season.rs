//! Seasonal aggregation of weekly layers.
//!
//! Seasons are month/day windows of the reference year. A window whose
//! start falls after its end wraps the new year, so a non-breeding season
//! from mid-November to early March is a single season.

use abundance_trends_abundance_models::{AbundanceGrid, AbundanceStack, SeasonConfig};
use chrono::{Datelike, NaiveDate};

use crate::AnalyticsError;

/// A named window of the reference year, bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    /// Season name.
    pub name: String,
    start: (u32, u32),
    end: (u32, u32),
}

impl Season {
    /// Parses a season from `MM-DD` bounds.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidSeasonBound`] if a bound is not a
    /// real calendar day (February 29 is accepted).
    pub fn parse(name: &str, start: &str, end: &str) -> Result<Self, AnalyticsError> {
        Ok(Self {
            name: name.to_string(),
            start: parse_month_day(start)?,
            end: parse_month_day(end)?,
        })
    }

    /// Whether the window wraps the new year.
    #[must_use]
    pub fn wraps_year(&self) -> bool {
        self.start > self.end
    }

    /// Whether `date` falls inside the window, ignoring the year.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        let md = (date.month(), date.day());
        if self.wraps_year() {
            md >= self.start || md <= self.end
        } else {
            self.start <= md && md <= self.end
        }
    }
}

impl TryFrom<&SeasonConfig> for Season {
    type Error = AnalyticsError;

    fn try_from(config: &SeasonConfig) -> Result<Self, Self::Error> {
        Self::parse(&config.name, &config.start, &config.end)
    }
}

fn parse_month_day(value: &str) -> Result<(u32, u32), AnalyticsError> {
    let invalid = || AnalyticsError::InvalidSeasonBound {
        value: value.to_string(),
    };

    let (month, day) = value.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let day: u32 = day.parse().map_err(|_| invalid())?;

    // Leap year so that 02-29 is a valid bound.
    NaiveDate::from_ymd_opt(2000, month, day).ok_or_else(invalid)?;

    Ok((month, day))
}

/// Per-cell mean abundance over the weeks of `stack` inside `season`.
///
/// No-data cells are skipped per week; a cell without data in every
/// selected week stays no data (NaN) in the result.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptySeason`] if no week falls in the season
/// and [`AnalyticsError::GeometryMismatch`] if the selected weeks do not
/// share one geometry and value count.
pub fn seasonal_mean(stack: &AbundanceStack, season: &Season) -> Result<AbundanceGrid, AnalyticsError> {
    let weeks: Vec<_> = stack
        .weeks
        .iter()
        .filter(|w| season.contains(w.date))
        .collect();

    let Some(first) = weeks.first() else {
        return Err(AnalyticsError::EmptySeason {
            season: season.name.clone(),
            species: stack.species.clone(),
        });
    };

    let geometry = first.grid.geometry;

    if let Some(bad) = weeks
        .iter()
        .find(|w| w.grid.geometry != geometry || !w.grid.has_consistent_len())
    {
        return Err(AnalyticsError::GeometryMismatch {
            message: format!(
                "{} week {} does not match the season's first week {}",
                stack.species, bad.date, first.date
            ),
        });
    }

    let cells = first.grid.values.len();
    let mut sums = vec![0.0_f64; cells];
    let mut counts = vec![0_u32; cells];

    for week in &weeks {
        for (i, v) in week.grid.data_cells() {
            sums[i] += v;
            counts[i] += 1;
        }
    }

    let values = sums
        .into_iter()
        .zip(counts)
        .map(|(sum, n)| if n == 0 { f64::NAN } else { sum / f64::from(n) })
        .collect();

    log::debug!(
        "{}: {} season mean over {} weeks",
        stack.species,
        season.name,
        weeks.len()
    );

    Ok(AbundanceGrid::new(geometry, values, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{stack, week_date};

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, month, day).unwrap()
    }

    #[test]
    fn plain_window_contains_inclusive_bounds() {
        let season = Season::parse("breeding", "05-10", "08-20").unwrap();
        assert!(!season.wraps_year());
        assert!(season.contains(date(5, 10)));
        assert!(season.contains(date(8, 20)));
        assert!(!season.contains(date(5, 9)));
        assert!(!season.contains(date(12, 1)));
    }

    #[test]
    fn wrapping_window_spans_new_year() {
        let season = Season::parse("nonbreeding", "11-15", "03-01").unwrap();
        assert!(season.wraps_year());
        assert!(season.contains(date(12, 31)));
        assert!(season.contains(date(1, 1)));
        assert!(season.contains(date(3, 1)));
        assert!(!season.contains(date(3, 2)));
        assert!(!season.contains(date(7, 4)));
    }

    #[test]
    fn rejects_invalid_bounds() {
        assert!(Season::parse("x", "13-01", "01-01").is_err());
        assert!(Season::parse("x", "02-30", "03-01").is_err());
        assert!(Season::parse("x", "0210", "03-01").is_err());
        assert!(Season::parse("x", "02-29", "03-01").is_ok());
    }

    #[test]
    fn mean_skips_no_data_and_out_of_season_weeks() {
        // Weeks 0..3 are 2022-01-04, -11, -18, -25.
        let s = stack(
            "A",
            3,
            1,
            &[
                vec![1.0, f64::NAN, f64::NAN],
                vec![3.0, 4.0, f64::NAN],
                vec![100.0, 100.0, 100.0],
                vec![5.0, 8.0, f64::NAN],
            ],
        );
        let season = Season::parse("early", "01-01", "01-12").unwrap();
        let mean = seasonal_mean(&s, &season).unwrap();

        assert_eq!(mean.value(0), Some(2.0));
        assert_eq!(mean.value(1), Some(4.0));
        assert_eq!(mean.value(2), None);
        assert!(week_date(2) > date(1, 12));
    }

    #[test]
    fn empty_season_is_an_error() {
        let s = stack("A", 1, 1, &[vec![1.0]]);
        let season = Season::parse("summer", "06-01", "08-31").unwrap();
        assert!(matches!(
            seasonal_mean(&s, &season),
            Err(AnalyticsError::EmptySeason { .. })
        ));
    }

    #[test]
    fn mismatched_week_is_an_error() {
        let mut s = stack("A", 2, 1, &[vec![1.0, 1.0], vec![1.0, 1.0]]);
        s.weeks[1].grid.values.pop();
        let season = Season::parse("all", "01-01", "12-31").unwrap();
        assert!(matches!(
            seasonal_mean(&s, &season),
            Err(AnalyticsError::GeometryMismatch { .. })
        ));
    }

    #[test]
    fn converts_from_config() {
        let config = SeasonConfig {
            name: "Breeding".to_string(),
            start: "05-10".to_string(),
            end: "08-20".to_string(),
        };
        let season = Season::try_from(&config).unwrap();
        assert_eq!(season.name, "Breeding");
    }
}
