//! Run configuration types, deserialized from TOML.
//!
//! A run names one target region and any number of species stacks:
//!
//! ```toml
//! output = "data/generated/trajectories.csv"
//! execution = "parallel"
//!
//! [region]
//! file = "data/regions/states.geojson"
//! name = "Pennsylvania"
//! crs = "EPSG:8857"
//!
//! [[species]]
//! name = "Wood Thrush"
//! stack = "data/stacks/wood_thrush.json"
//! ```

use serde::{Deserialize, Serialize};

/// How independent units of work (weeks, species) are scheduled.
///
/// Both modes produce identical output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One unit at a time on the calling thread.
    Sequential,
    /// Units fanned out over the rayon thread pool.
    #[default]
    Parallel,
}

impl ExecutionMode {
    /// Whether units run on the thread pool.
    #[must_use]
    pub const fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel)
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Top-level run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target region.
    pub region: RegionConfig,
    /// Where to write the trajectory CSV. Defaults to the generated data
    /// directory when absent.
    #[serde(default)]
    pub output: Option<String>,
    /// Scheduling of species and weeks.
    #[serde(default)]
    pub execution: ExecutionMode,
    /// Species stacks to aggregate.
    #[serde(default)]
    pub species: Vec<SpeciesConfig>,
    /// Named seasons available to seasonal aggregation.
    #[serde(default)]
    pub seasons: Vec<SeasonConfig>,
}

impl RunConfig {
    /// Looks up a season by name (case-insensitive).
    #[must_use]
    pub fn season(&self, name: &str) -> Option<&SeasonConfig> {
        self.seasons
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

/// Where the target region polygon comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// `GeoJSON` `FeatureCollection` path.
    pub file: String,
    /// Region name to select from the collection.
    pub name: String,
    /// CRS the polygon coordinates are expressed in. Must match the
    /// stacks' CRS.
    pub crs: String,
    /// Feature property holding the region name.
    #[serde(default = "default_name_property")]
    pub name_property: String,
}

fn default_name_property() -> String {
    "name".to_string()
}

/// One species stack to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesConfig {
    /// Species common name. Overrides the name stored in the stack file.
    pub name: String,
    /// Path to the stack JSON file. Defaults to the species' file in the
    /// data directory's `stacks/` folder.
    #[serde(default)]
    pub stack: Option<String>,
}

/// A named season as `MM-DD` bounds (inclusive). A start after the end
/// wraps across the new year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonConfig {
    /// Season name (e.g. `"breeding"`).
    pub name: String,
    /// First day, `MM-DD`.
    pub start: String,
    /// Last day, `MM-DD`.
    pub end: String,
}
