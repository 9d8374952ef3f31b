//! Weekly species richness derived from trajectories.

use std::collections::{BTreeMap, BTreeSet};

use abundance_trends_analytics_models::{RichnessRecord, TrajectoryRecord};
use chrono::NaiveDate;

/// Counts, per date, the distinct species with a defined non-zero
/// proportion.
///
/// Every date that appears in `records` gets a row, in chronological
/// order, even when no species is present. Repeated `(species, date)`
/// records count once.
#[must_use]
pub fn compute_richness(records: &[TrajectoryRecord]) -> Vec<RichnessRecord> {
    let mut by_date: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();

    for record in records {
        let present = by_date.entry(record.date).or_default();
        if record.proportion.is_present() {
            present.insert(&record.species);
        }
    }

    by_date
        .into_iter()
        .map(|(date, species)| RichnessRecord {
            date,
            count: u32::try_from(species.len()).unwrap_or(u32::MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use abundance_trends_analytics_models::Proportion;

    use super::*;
    use crate::test_support::week_date;

    fn record(species: &str, week: usize, proportion: Proportion) -> TrajectoryRecord {
        TrajectoryRecord {
            species: species.to_string(),
            date: week_date(week),
            proportion,
        }
    }

    fn counts(richness: &[RichnessRecord]) -> Vec<u32> {
        richness.iter().map(|r| r.count).collect()
    }

    #[test]
    fn two_species_scenario() {
        let records = [
            record("A", 0, Proportion::Defined(0.1)),
            record("A", 1, Proportion::Defined(0.0)),
            record("A", 2, Proportion::Defined(0.3)),
            record("B", 0, Proportion::Defined(0.0)),
            record("B", 1, Proportion::Defined(0.0)),
            record("B", 2, Proportion::Defined(0.2)),
        ];

        let richness = compute_richness(&records);
        assert_eq!(counts(&richness), [1, 0, 2]);
        assert_eq!(
            richness.iter().map(|r| r.date).collect::<Vec<_>>(),
            [week_date(0), week_date(1), week_date(2)]
        );
    }

    #[test]
    fn undefined_weeks_do_not_count() {
        let records = [
            record("A", 0, Proportion::Defined(0.25)),
            record("A", 1, Proportion::Undefined),
            record("A", 2, Proportion::Defined(0.0)),
        ];
        assert_eq!(counts(&compute_richness(&records)), [1, 0, 0]);
    }

    #[test]
    fn duplicates_count_once_and_order_is_chronological() {
        let records = [
            record("B", 1, Proportion::Defined(0.5)),
            record("A", 0, Proportion::Defined(0.5)),
            record("A", 0, Proportion::Defined(0.7)),
            record("A", 1, Proportion::Defined(0.2)),
        ];

        let richness = compute_richness(&records);
        assert_eq!(richness[0].date, week_date(0));
        assert_eq!(counts(&richness), [1, 2]);
    }

    #[test]
    fn never_exceeds_species_per_date() {
        let records: Vec<TrajectoryRecord> = (0..5)
            .flat_map(|s| {
                (0..4).map(move |w| {
                    let p = if (s + w) % 3 == 0 {
                        Proportion::Undefined
                    } else {
                        Proportion::Defined(0.1)
                    };
                    record(&format!("S{s}"), w, p)
                })
            })
            .collect();

        for row in compute_richness(&records) {
            let species_on_date = records
                .iter()
                .filter(|r| r.date == row.date)
                .map(|r| r.species.as_str())
                .collect::<BTreeSet<_>>()
                .len();
            assert!(row.count as usize <= species_on_date);
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(compute_richness(&[]).is_empty());
    }
}
