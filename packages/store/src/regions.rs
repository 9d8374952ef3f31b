//! `GeoJSON` region collections.

use std::path::Path;

use abundance_trends_abundance_models::RegionConfig;
use abundance_trends_spatial::{Region, RegionIndex};

use crate::StoreError;
use crate::paths::resolve;

/// Loads every named polygon of a `GeoJSON` `FeatureCollection`.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or is not a
/// `FeatureCollection`.
pub fn load_regions(path: &Path, name_property: &str, crs: &str) -> Result<RegionIndex, StoreError> {
    let geojson = std::fs::read_to_string(path)?;
    let index = RegionIndex::from_geojson(&geojson, name_property, crs)?;

    log::info!("Loaded {} regions from {}", index.len(), path.display());

    Ok(index)
}

/// Loads the configured target region, resolving its file against `base`.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be loaded or holds no region
/// with the configured name.
pub fn load_region(config: &RegionConfig, base: &Path) -> Result<Region, StoreError> {
    let index = load_regions(
        &resolve(base, &config.file),
        &config.name_property,
        &config.crs,
    )?;
    Ok(index.require(&config.name)?.clone())
}
