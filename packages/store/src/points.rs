//! CSV site lists, point estimates, and site selections.

use std::io::{Read, Write};
use std::path::Path;

use abundance_trends_analytics_models::{PointEstimate, Site, SiteSelection};

use crate::StoreError;
use crate::paths::ensure_parent;

/// Reads sites from CSV with header `id,x,y`.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if a row is malformed.
pub fn read_sites<R: Read>(reader: R) -> Result<Vec<Site>, StoreError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let sites = csv.deserialize().collect::<Result<Vec<_>, _>>()?;
    Ok(sites)
}

/// Reads sites from a CSV file.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or a row is malformed.
pub fn load_sites(path: &Path) -> Result<Vec<Site>, StoreError> {
    read_sites(std::fs::File::open(path)?)
}

/// Writes point estimates as CSV with header `id,x,y,median,lower,upper`.
/// Missing values are empty fields.
///
/// # Errors
///
/// Returns [`StoreError`] if the writer fails.
pub fn write_estimates<W: Write>(writer: W, estimates: &[PointEstimate]) -> Result<(), StoreError> {
    let mut csv = csv::Writer::from_writer(writer);
    for estimate in estimates {
        csv.serialize(estimate)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes point estimates to a CSV file, creating parent directories.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn save_estimates(path: &Path, estimates: &[PointEstimate]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    write_estimates(std::fs::File::create(path)?, estimates)?;
    log::info!("Wrote {} point estimates to {}", estimates.len(), path.display());
    Ok(())
}

/// Writes a site selection as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn save_selection(path: &Path, selection: &SiteSelection) -> Result<(), StoreError> {
    ensure_parent(path)?;
    std::fs::write(path, serde_json::to_string_pretty(selection)?)?;
    log::info!(
        "Wrote {} selected cells to {}",
        selection.cells.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_sites_with_padding() {
        let sites = read_sites("id, x, y\nnest-1, 10.5, -3\nnest-2,0,0\n".as_bytes()).unwrap();
        assert_eq!(
            sites,
            [
                Site {
                    id: "nest-1".to_string(),
                    x: 10.5,
                    y: -3.0,
                },
                Site {
                    id: "nest-2".to_string(),
                    x: 0.0,
                    y: 0.0,
                },
            ]
        );
    }

    #[test]
    fn missing_estimates_are_empty_fields() {
        let mut out = Vec::new();
        write_estimates(
            &mut out,
            &[PointEstimate {
                id: "a".to_string(),
                x: 1.0,
                y: 2.0,
                median: Some(0.5),
                lower: None,
                upper: Some(1.25),
            }],
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,x,y,median,lower,upper\na,1.0,2.0,0.5,,1.25\n"
        );
    }
}
