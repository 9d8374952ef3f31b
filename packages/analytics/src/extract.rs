//! Abundance and confidence bounds at point locations.

use abundance_trends_abundance_models::AbundanceGrid;
use abundance_trends_analytics_models::{PointEstimate, Site};

use crate::AnalyticsError;

/// Reads the median, lower, and upper layers at each site.
///
/// A site off the grid or on a no-data cell gets `None` for that layer.
/// Output follows the order of `sites`.
///
/// # Errors
///
/// Returns [`AnalyticsError::GeometryMismatch`] if the three layers do not
/// share one geometry.
pub fn extract_intervals(
    median: &AbundanceGrid,
    lower: &AbundanceGrid,
    upper: &AbundanceGrid,
    sites: &[Site],
) -> Result<Vec<PointEstimate>, AnalyticsError> {
    for (label, layer) in [("lower", lower), ("upper", upper)] {
        if layer.geometry != median.geometry {
            return Err(AnalyticsError::GeometryMismatch {
                message: format!("{label} bound layer differs from the median layer"),
            });
        }
    }

    let estimates = sites
        .iter()
        .map(|site| {
            let cell = median.geometry.cell_at(site.x, site.y);
            let read = |layer: &AbundanceGrid| cell.and_then(|i| layer.value(i));

            let estimate = PointEstimate {
                id: site.id.clone(),
                x: site.x,
                y: site.y,
                median: read(median),
                lower: read(lower),
                upper: read(upper),
            };

            if let (Some(lo), Some(m), Some(hi)) = (estimate.lower, estimate.median, estimate.upper)
            {
                if lo > m || m > hi {
                    log::warn!(
                        "Site {}: bounds out of order (lower {lo}, median {m}, upper {hi})",
                        site.id
                    );
                }
            }

            estimate
        })
        .collect();

    Ok(estimates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::geometry;

    fn site(id: &str, x: f64, y: f64) -> Site {
        Site {
            id: id.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn reads_all_three_layers() {
        let median = AbundanceGrid::new(geometry(2, 1), vec![1.0, 2.0], None);
        let lower = AbundanceGrid::new(geometry(2, 1), vec![0.5, f64::NAN], None);
        let upper = AbundanceGrid::new(geometry(2, 1), vec![1.5, 3.0], None);

        let estimates = extract_intervals(
            &median,
            &lower,
            &upper,
            &[site("a", 0.5, 0.5), site("b", 1.5, 0.5), site("off", 9.0, 9.0)],
        )
        .unwrap();

        assert_eq!(
            estimates[0],
            PointEstimate {
                id: "a".to_string(),
                x: 0.5,
                y: 0.5,
                median: Some(1.0),
                lower: Some(0.5),
                upper: Some(1.5),
            }
        );
        assert_eq!(estimates[1].median, Some(2.0));
        assert_eq!(estimates[1].lower, None);
        assert_eq!(estimates[2].id, "off");
        assert_eq!(
            (estimates[2].median, estimates[2].lower, estimates[2].upper),
            (None, None, None)
        );
    }

    #[test]
    fn mismatched_layers_are_rejected() {
        let median = AbundanceGrid::new(geometry(2, 1), vec![1.0, 2.0], None);
        let upper = AbundanceGrid::new(geometry(1, 1), vec![1.0], None);
        assert!(matches!(
            extract_intervals(&median, &median, &upper, &[]),
            Err(AnalyticsError::GeometryMismatch { .. })
        ));
    }
}
