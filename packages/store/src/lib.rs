#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! File persistence for the abundance-trends toolkit.
//!
//! Everything on disk lives under the workspace `data/` directory by
//! default: stack files in `data/stacks/`, region collections in
//! `data/regions/`, and outputs in `data/generated/`. Stacks and single
//! grids are JSON, regions are `GeoJSON`, run configuration is TOML, and
//! tabular outputs are CSV.

pub mod config;
pub mod paths;
pub mod points;
pub mod regions;
pub mod stacks;
pub mod trajectories;

use thiserror::Error;

/// Errors that can occur while reading or writing data files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV (de)serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The TOML run configuration is malformed.
    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Region loading or lookup failed.
    #[error(transparent)]
    Spatial(#[from] abundance_trends_spatial::SpatialError),

    /// A file parsed but its contents are unusable.
    #[error("Invalid data in {path}: {message}")]
    Invalid {
        /// File that was being read.
        path: String,
        /// What is wrong with it.
        message: String,
    },
}
