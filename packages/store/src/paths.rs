//! Canonical locations inside the `data/` directory.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`. Falls back to the
/// current directory if the manifest is not nested two levels deep.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the `data/stacks/` directory for weekly stack files.
#[must_use]
pub fn stacks_dir() -> PathBuf {
    data_dir().join("stacks")
}

/// Returns the `data/generated/` directory for output artifacts.
#[must_use]
pub fn generated_dir() -> PathBuf {
    data_dir().join("generated")
}

/// Returns the default stack file for a species, e.g.
/// `data/stacks/wood_thrush.json`.
#[must_use]
pub fn default_stack_path(species: &str) -> PathBuf {
    stacks_dir().join(format!("{}.json", slug(species)))
}

/// Returns the default trajectory CSV path for a region.
#[must_use]
pub fn default_trajectory_path(region: &str) -> PathBuf {
    generated_dir().join(format!("{}_trajectories.csv", slug(region)))
}

/// Returns the default richness CSV path for a region.
#[must_use]
pub fn default_richness_path(region: &str) -> PathBuf {
    generated_dir().join(format!("{}_richness.csv", slug(region)))
}

/// Resolves `path` against `base` unless it is already absolute.
#[must_use]
pub fn resolve(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Creates the parent directory of `path` if it has one.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

fn slug(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
