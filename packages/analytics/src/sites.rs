//! Quantile-based site selection.
//!
//! Picks the cells of a region whose abundance reaches a given quantile of
//! the region's own distribution, e.g. the top decile of a seasonal map.

use abundance_trends_abundance_models::AbundanceGrid;
use abundance_trends_analytics_models::{SelectedCell, SiteSelection};
use abundance_trends_spatial::RegionMask;

use crate::AnalyticsError;

/// Selects every data cell inside `mask` whose value is at or above the
/// `quantile` of the masked values.
///
/// The threshold interpolates linearly between order statistics at
/// position `(n - 1) * quantile`. Selected cells are sorted by descending
/// value, ties by cell index.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidQuantile`] for a quantile outside
/// `[0, 1]`, [`AnalyticsError::GeometryMismatch`] if the mask was built
/// for another geometry, and [`AnalyticsError::NoCandidateCells`] if the
/// region holds no data cells.
pub fn select_sites(
    grid: &AbundanceGrid,
    mask: &RegionMask,
    quantile: f64,
) -> Result<SiteSelection, AnalyticsError> {
    if !(0.0..=1.0).contains(&quantile) {
        return Err(AnalyticsError::InvalidQuantile { quantile });
    }

    if *mask.geometry() != grid.geometry || !grid.has_consistent_len() {
        return Err(AnalyticsError::GeometryMismatch {
            message: "region mask was built for a different grid".to_string(),
        });
    }

    let candidates: Vec<(usize, f64)> = grid.data_cells().filter(|(i, _)| mask.contains(*i)).collect();

    if candidates.is_empty() {
        return Err(AnalyticsError::NoCandidateCells);
    }

    let mut sorted: Vec<f64> = candidates.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(f64::total_cmp);
    let threshold = interpolate_quantile(&sorted, quantile);

    let mut cells: Vec<SelectedCell> = candidates
        .iter()
        .filter(|(_, v)| *v >= threshold)
        .map(|&(index, value)| {
            let (x, y) = grid.geometry.cell_center(index);
            SelectedCell { index, x, y, value }
        })
        .collect();

    cells.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.index.cmp(&b.index)));

    log::debug!(
        "Selected {} of {} cells at quantile {quantile} (threshold {threshold})",
        cells.len(),
        candidates.len()
    );

    Ok(SiteSelection {
        quantile,
        threshold,
        candidate_count: candidates.len(),
        cells,
    })
}

/// Quantile of ascending `sorted` values by linear interpolation.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn interpolate_quantile(sorted: &[f64], quantile: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * quantile;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    let fraction = h - h.floor();
    fraction.mul_add(sorted[hi] - sorted[lo], sorted[lo])
}
