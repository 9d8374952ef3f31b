//! Multi-species trajectory runs with per-species failure isolation.

use std::collections::BTreeSet;
use std::sync::Arc;

use abundance_trends_abundance_models::{AbundanceStack, ExecutionMode};
use abundance_trends_analytics_models::{TrajectoryRecord, UndefinedWeek};
use abundance_trends_spatial::Region;
use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::trajectory::{TrajectoryError, compute_trajectory};

/// Outcome of a multi-species run.
///
/// A species either contributes its full trajectory to `records` or a
/// single entry to `failures`, never both. Undefined weeks are listed
/// separately from failures: they are valid output, not errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Trajectory records, grouped by species in input order, then by date.
    pub records: Vec<TrajectoryRecord>,
    /// Species whose trajectory could not be computed.
    pub failures: Vec<TrajectoryError>,
    /// Weeks whose proportion is undefined.
    pub undefined: Vec<UndefinedWeek>,
}

impl BatchReport {
    /// Whether every species was computed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the species that failed.
    pub fn failed_species(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(TrajectoryError::species)
    }
}

/// Computes trajectories for every stack against one region.
///
/// Species are independent tasks. A structural failure in one species is
/// recorded in [`BatchReport::failures`] and leaves the others untouched.
/// A species name seen earlier in `stacks` is reported as
/// [`TrajectoryError::DuplicateSpecies`].
#[must_use]
pub fn compute_batch(
    stacks: &[AbundanceStack],
    region: &Region,
    mode: ExecutionMode,
    progress: &Arc<dyn ProgressCallback>,
) -> BatchReport {
    progress.set_total(stacks.len() as u64);
    progress.set_message(format!("Aggregating {} species", stacks.len()));

    let mut seen = BTreeSet::new();
    let duplicate: Vec<bool> = stacks
        .iter()
        .map(|s| !seen.insert(s.species.as_str()))
        .collect();

    let run = |(i, stack): (usize, &AbundanceStack)| {
        let result = if duplicate[i] {
            Err(TrajectoryError::DuplicateSpecies {
                species: stack.species.clone(),
            })
        } else {
            compute_trajectory(stack, region, mode)
        };
        progress.inc(1);
        result
    };

    let results: Vec<Result<Vec<TrajectoryRecord>, TrajectoryError>> = if mode.is_parallel() {
        stacks.par_iter().enumerate().map(run).collect()
    } else {
        stacks.iter().enumerate().map(run).collect()
    };

    let mut report = BatchReport::default();

    for result in results {
        match result {
            Ok(records) => {
                report.undefined.extend(
                    records
                        .iter()
                        .enumerate()
                        .filter(|(_, r)| r.proportion.is_undefined())
                        .map(|(week, r)| UndefinedWeek {
                            species: r.species.clone(),
                            week,
                            date: r.date,
                        }),
                );
                report.records.extend(records);
            }
            Err(e) => {
                log::warn!("Trajectory failed: {e}");
                report.failures.push(e);
            }
        }
    }

    let computed = stacks.len() - report.failures.len();
    log::info!(
        "Computed trajectories for {computed} of {} species in {} ({} records, {} undefined weeks, {} failures)",
        stacks.len(),
        region.name,
        report.records.len(),
        report.undefined.len(),
        report.failures.len(),
    );
    progress.finish(format!(
        "{computed}/{} species aggregated",
        stacks.len()
    ));

    report
}

#[cfg(test)]
mod tests {
    use abundance_trends_analytics_models::Proportion;

    use super::*;
    use crate::progress::null_progress;
    use crate::test_support::{region, stack, week_date};

    #[test]
    fn failures_do_not_affect_other_species() {
        let stacks = [
            stack("A", 2, 1, &[vec![1.0, 1.0], vec![0.0, 0.0]]),
            stack("Broken", 2, 1, &[vec![1.0, 1.0], vec![1.0]]),
            stack("C", 2, 1, &[vec![0.0, 4.0], vec![3.0, 1.0]]),
        ];
        let r = region(0.0, 0.0, 1.0, 1.0);

        let report = compute_batch(&stacks, &r, ExecutionMode::Parallel, &null_progress());

        assert!(!report.is_complete());
        assert_eq!(report.failed_species().collect::<Vec<_>>(), ["Broken"]);
        assert_eq!(
            report
                .records
                .iter()
                .map(|r| (r.species.as_str(), r.proportion))
                .collect::<Vec<_>>(),
            [
                ("A", Proportion::Defined(0.5)),
                ("A", Proportion::Undefined),
                ("C", Proportion::Defined(0.0)),
                ("C", Proportion::Defined(0.75)),
            ]
        );
        assert_eq!(
            report.undefined,
            [UndefinedWeek {
                species: "A".to_string(),
                week: 1,
                date: week_date(1),
            }]
        );
    }

    #[test]
    fn duplicate_species_is_reported() {
        let stacks = [
            stack("A", 1, 1, &[vec![1.0]]),
            stack("A", 1, 1, &[vec![2.0]]),
        ];
        let report = compute_batch(
            &stacks,
            &region(0.0, 0.0, 1.0, 1.0),
            ExecutionMode::Sequential,
            &null_progress(),
        );

        assert_eq!(report.records.len(), 1);
        assert!(matches!(
            report.failures.as_slice(),
            [TrajectoryError::DuplicateSpecies { species }] if species == "A"
        ));
    }

    #[test]
    fn parallel_and_sequential_reports_match() {
        let stacks: Vec<AbundanceStack> = (0..6)
            .map(|s| {
                let weeks: Vec<Vec<f64>> = (0..10)
                    .map(|w| {
                        (0..6)
                            .map(|c| f64::from((s * 31 + w * 7 + c * 3) % 11))
                            .collect()
                    })
                    .collect();
                stack(&format!("S{s}"), 3, 2, &weeks)
            })
            .collect();
        let r = region(0.0, 0.0, 2.0, 2.0);

        let sequential = compute_batch(&stacks, &r, ExecutionMode::Sequential, &null_progress());
        let parallel = compute_batch(&stacks, &r, ExecutionMode::Parallel, &null_progress());

        assert!(sequential.is_complete());
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.records.len(), 60);
    }

    #[test]
    fn empty_batch_is_empty_report() {
        let report = compute_batch(
            &[],
            &region(0.0, 0.0, 1.0, 1.0),
            ExecutionMode::Parallel,
            &null_progress(),
        );
        assert_eq!(report, BatchReport::default());
    }

    #[test]
    fn malformed_geometry_is_isolated_from_other_species() {
        let good = stack("Good", 2, 1, &[vec![1.0, 3.0]]);
        let mut bad = stack("Bad", 2, 1, &[vec![1.0, 1.0]]);
        bad.weeks[0].grid.geometry.width = usize::MAX / 2;
        bad.weeks[0].grid.geometry.height = 3;

        let report = compute_batch(
            &[good, bad],
            &region(0.0, 0.0, 1.0, 1.0),
            ExecutionMode::Parallel,
            &null_progress(),
        );

        assert_eq!(report.failed_species().collect::<Vec<_>>(), ["Bad"]);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].species, "Good");
        assert_eq!(report.records[0].proportion, Proportion::Defined(0.25));
    }
}
