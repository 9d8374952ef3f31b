//! JSON stack and grid files.

use std::path::Path;

use abundance_trends_abundance_models::{
    AbundanceGrid, AbundanceStack, GridFile, SpeciesConfig, StackFile,
};

use crate::StoreError;
use crate::paths::{default_stack_path, ensure_parent, resolve};

/// Parses a stack from its JSON text.
///
/// # Errors
///
/// Returns [`StoreError::Json`] if the document does not match the stack
/// layout.
pub fn parse_stack(json: &str) -> Result<AbundanceStack, StoreError> {
    let file: StackFile = serde_json::from_str(json)?;
    Ok(file.into())
}

/// Loads a weekly stack file.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or parsed.
pub fn load_stack(path: &Path) -> Result<AbundanceStack, StoreError> {
    let json = std::fs::read_to_string(path)?;
    let stack = parse_stack(&json)?;

    log::debug!(
        "Loaded {} ({} weeks, {}) from {}",
        stack.species,
        stack.len(),
        stack.crs,
        path.display()
    );

    if !stack.is_full_year() {
        log::warn!(
            "{}: stack has {} weeks, computing over the weeks available",
            stack.species,
            stack.len()
        );
    }

    Ok(stack)
}

/// Loads the stack for a configured species, resolving its path against
/// `base` and naming it after the configured species. Without a configured
/// path the species' file under `data/stacks/` is used.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or parsed.
pub fn load_species(config: &SpeciesConfig, base: &Path) -> Result<AbundanceStack, StoreError> {
    let path = config.stack.as_deref().map_or_else(
        || default_stack_path(&config.name),
        |stack| resolve(base, stack),
    );
    let mut stack = load_stack(&path)?;
    if stack.species != config.name {
        log::debug!("Renaming stack {} to {}", stack.species, config.name);
        stack.species.clone_from(&config.name);
    }
    Ok(stack)
}

/// Loads a single-layer grid file, returning its CRS and grid.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or parsed, or if the
/// value count disagrees with the geometry.
pub fn load_grid(path: &Path) -> Result<(String, AbundanceGrid), StoreError> {
    let json = std::fs::read_to_string(path)?;
    let file: GridFile = serde_json::from_str(&json)?;
    let (crs, grid) = file.into_grid();

    if !grid.has_consistent_len() {
        return Err(StoreError::Invalid {
            path: path.display().to_string(),
            message: format!(
                "{} values for a {}x{} grid",
                grid.values.len(),
                grid.geometry.width,
                grid.geometry.height
            ),
        });
    }

    Ok((crs, grid))
}

/// Writes a single-layer grid file. No-data cells are written as `null`.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn write_grid(path: &Path, crs: &str, grid: &AbundanceGrid) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let json = serde_json::to_string(&GridFile::from_grid(crs, grid))?;
    std::fs::write(path, json)?;
    log::info!("Wrote grid to {}", path.display());
    Ok(())
}
