#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Relative-abundance raster types.
//!
//! A species' modeled abundance arrives as a stack of weekly grids sharing
//! one north-up geometry. These types hold already-decoded cell values;
//! decoding and reprojection happen upstream. The on-disk JSON layout and
//! the TOML run configuration live here too so every package agrees on
//! them.

pub mod config;
pub mod grid;
pub mod stack;

pub use config::{ExecutionMode, RegionConfig, RunConfig, SeasonConfig, SpeciesConfig};
pub use grid::{AbundanceGrid, GridGeometry, GridTransform};
pub use stack::{AbundanceStack, GridFile, StackFile, WEEKS_PER_YEAR, WeekLayerFile, WeeklyGrid};
