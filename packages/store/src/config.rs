//! TOML run configuration.

use std::path::{Path, PathBuf};

use abundance_trends_abundance_models::RunConfig;

use crate::StoreError;

/// Parses a run configuration from TOML text.
///
/// # Errors
///
/// Returns [`StoreError::Toml`] if the document is malformed.
pub fn parse_run_config(toml: &str) -> Result<RunConfig, StoreError> {
    Ok(toml::from_str(toml)?)
}

/// Loads a run configuration file.
///
/// Returns the configuration together with the directory its relative
/// paths resolve against.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or parsed.
pub fn load_run_config(path: &Path) -> Result<(RunConfig, PathBuf), StoreError> {
    let text = std::fs::read_to_string(path)?;
    let config = parse_run_config(&text)?;
    let base = path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    log::info!(
        "Loaded run config {} ({} species, region {})",
        path.display(),
        config.species.len(),
        config.region.name
    );

    Ok((config, base))
}

#[cfg(test)]
mod tests {
    use abundance_trends_abundance_models::ExecutionMode;

    use super::*;

    #[test]
    fn parses_full_config() {
        let config = parse_run_config(
            r#"
            output = "out/pa.csv"
            execution = "sequential"

            [region]
            file = "regions/states.geojson"
            name = "Pennsylvania"
            crs = "EPSG:8857"
            name_property = "NAME"

            [[species]]
            name = "Wood Thrush"
            stack = "stacks/woothr.json"

            [[species]]
            name = "Scarlet Tanager"
            stack = "stacks/scatan.json"

            [[seasons]]
            name = "breeding"
            start = "05-10"
            end = "08-20"
            "#,
        )
        .unwrap();

        assert_eq!(config.execution, ExecutionMode::Sequential);
        assert_eq!(config.species.len(), 2);
        assert_eq!(config.region.name_property, "NAME");
        assert_eq!(config.output.as_deref(), Some("out/pa.csv"));
        assert!(config.season("Breeding").is_some());
    }

    #[test]
    fn missing_region_is_an_error() {
        assert!(matches!(
            parse_run_config("execution = \"parallel\""),
            Err(StoreError::Toml(_))
        ));
    }
}
