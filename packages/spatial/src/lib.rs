#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory region index and grid masks.
//!
//! Loads named region polygons (states, provinces, reserves) from a
//! `GeoJSON` `FeatureCollection`, builds an R-tree over their envelopes,
//! and answers name and point-in-polygon lookups. [`RegionMask`] selects
//! the grid cells whose centers fall inside a region; every region-based
//! sum and masked map goes through it so numbers and maps agree.
//!
//! Polygons must already be in the grid's CRS. Reprojection is the
//! caller's job; the CRS label carried by [`Region`] only lets consumers
//! refuse mismatched inputs.

pub mod mask;

use std::collections::BTreeMap;

use geo::{Area, BoundingRect, Contains, MultiPolygon, Point};
use geojson::GeoJson;
use rstar::{AABB, RTree, RTreeObject};
use thiserror::Error;

pub use mask::RegionMask;

/// Errors that can occur while loading or querying regions.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The `GeoJSON` document could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// No region with the requested name.
    #[error("Region not found: {name}")]
    RegionNotFound {
        /// Requested region name.
        name: String,
    },
}

/// A named region polygon tagged with the CRS its coordinates use.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Region name (e.g. `"Pennsylvania"`).
    pub name: String,
    /// Coordinate reference system identifier.
    pub crs: String,
    /// Boundary.
    pub polygon: MultiPolygon<f64>,
}

impl Region {
    /// Creates a region.
    #[must_use]
    pub fn new(name: impl Into<String>, crs: impl Into<String>, polygon: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            crs: crs.into(),
            polygon,
        }
    }

    /// Whether `(x, y)` lies strictly inside the region.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.polygon.contains(&Point::new(x, y))
    }

    /// Planar area in squared CRS units.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.polygon.unsigned_area()
    }
}

/// A region stored in the R-tree, pointing back into the region list.
struct RegionEntry {
    index: usize,
    area: f64,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for RegionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Named regions with an R-tree for point lookups.
pub struct RegionIndex {
    regions: Vec<Region>,
    tree: RTree<RegionEntry>,
    /// lowercase name -> position in `regions`
    by_name: BTreeMap<String, usize>,
}

impl RegionIndex {
    /// Builds an index from regions. Later duplicates of a name are
    /// dropped.
    #[must_use]
    pub fn new(regions: Vec<Region>) -> Self {
        let mut kept = Vec::with_capacity(regions.len());
        let mut by_name = BTreeMap::new();

        for region in regions {
            let key = region.name.to_lowercase();
            if by_name.contains_key(&key) {
                log::warn!("Duplicate region name {}, keeping the first", region.name);
                continue;
            }
            by_name.insert(key, kept.len());
            kept.push(region);
        }

        let entries = kept
            .iter()
            .enumerate()
            .map(|(index, region)| RegionEntry {
                index,
                area: region.area(),
                envelope: compute_envelope(&region.polygon),
            })
            .collect();

        Self {
            regions: kept,
            tree: RTree::bulk_load(entries),
            by_name,
        }
    }

    /// Parses a `GeoJSON` `FeatureCollection` into an index.
    ///
    /// Each feature's name is read from `name_property`. Features without
    /// a string name or without polygonal geometry are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid `GeoJSON` or is not a
    /// `FeatureCollection`.
    pub fn from_geojson(geojson: &str, name_property: &str, crs: &str) -> Result<Self, SpatialError> {
        let GeoJson::FeatureCollection(collection) = geojson.parse::<GeoJson>()? else {
            return Err(SpatialError::NotFeatureCollection);
        };

        let mut regions = Vec::new();

        for (i, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature
                .property(name_property)
                .and_then(|v| v.as_str())
                .map(str::to_string)
            else {
                log::warn!("Feature {i} has no string property '{name_property}', skipping");
                continue;
            };

            let Some(polygon) = feature.geometry.and_then(to_multipolygon) else {
                log::warn!("Feature {name} has no polygonal geometry, skipping");
                continue;
            };

            regions.push(Region::new(name, crs, polygon));
        }

        log::info!("Loaded {} regions into spatial index", regions.len());

        Ok(Self::new(regions))
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the index holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// All regions in load order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Looks up a region by name (case-insensitive).
    #[must_use]
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&i| &self.regions[i])
    }

    /// Looks up a region by name, failing when it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::RegionNotFound`] if no region has that name.
    pub fn require(&self, name: &str) -> Result<&Region, SpatialError> {
        self.region(name).ok_or_else(|| SpatialError::RegionNotFound {
            name: name.to_string(),
        })
    }

    /// Finds the region containing `(x, y)`.
    ///
    /// Regions can overlap; the smallest area wins.
    #[must_use]
    pub fn lookup_region(&self, x: f64, y: f64) -> Option<&Region> {
        let query_env = AABB::from_point([x, y]);

        let mut best: Option<&RegionEntry> = None;

        for entry in self.tree.locate_in_envelope_intersecting(&query_env) {
            if self.regions[entry.index].contains_point(x, y) {
                match best {
                    None => best = Some(entry),
                    Some(current) if entry.area < current.area => {
                        best = Some(entry);
                    }
                    _ => {}
                }
            }
        }

        best.map(|e| &self.regions[e.index])
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
