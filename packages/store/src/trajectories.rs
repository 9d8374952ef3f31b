//! CSV persistence of trajectory and richness records.
//!
//! Trajectories use the header `species,date,proportion`. An undefined
//! proportion is an empty field, so it reads back as undefined rather
//! than as zero. Floats are written in shortest round-trip form, so a
//! written file reads back to identical values.

use std::io::{Read, Write};
use std::path::Path;

use abundance_trends_analytics_models::{RichnessRecord, TrajectoryRecord};

use crate::StoreError;
use crate::paths::ensure_parent;

/// Writes trajectory records as CSV.
///
/// # Errors
///
/// Returns [`StoreError`] if a record cannot be serialized or the writer
/// fails.
pub fn write_trajectories<W: Write>(writer: W, records: &[TrajectoryRecord]) -> Result<(), StoreError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Reads trajectory records from CSV.
///
/// # Errors
///
/// Returns [`StoreError::Csv`] if a row is malformed.
pub fn read_trajectories<R: Read>(reader: R) -> Result<Vec<TrajectoryRecord>, StoreError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records = csv.deserialize().collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Writes trajectory records to a CSV file, creating parent directories.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn save_trajectories(path: &Path, records: &[TrajectoryRecord]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    write_trajectories(std::fs::File::create(path)?, records)?;
    log::info!("Wrote {} trajectory records to {}", records.len(), path.display());
    Ok(())
}

/// Reads trajectory records from a CSV file.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be read or a row is malformed.
pub fn load_trajectories(path: &Path) -> Result<Vec<TrajectoryRecord>, StoreError> {
    let records = read_trajectories(std::fs::File::open(path)?)?;
    log::debug!("Read {} trajectory records from {}", records.len(), path.display());
    Ok(records)
}

/// Writes richness records as CSV with header `date,count`.
///
/// # Errors
///
/// Returns [`StoreError`] if the writer fails.
pub fn write_richness<W: Write>(writer: W, records: &[RichnessRecord]) -> Result<(), StoreError> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes richness records to a CSV file, creating parent directories.
///
/// # Errors
///
/// Returns [`StoreError`] if the file cannot be written.
pub fn save_richness(path: &Path, records: &[RichnessRecord]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    write_richness(std::fs::File::create(path)?, records)?;
    log::info!("Wrote {} richness rows to {}", records.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use abundance_trends_analytics_models::Proportion;
    use chrono::NaiveDate;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
    }

    fn records() -> Vec<TrajectoryRecord> {
        vec![
            TrajectoryRecord {
                species: "Wood Thrush".to_string(),
                date: date(4),
                proportion: Proportion::Defined(0.1 + 0.2),
            },
            TrajectoryRecord {
                species: "Wood Thrush".to_string(),
                date: date(11),
                proportion: Proportion::Undefined,
            },
            TrajectoryRecord {
                species: "Wood Thrush".to_string(),
                date: date(18),
                proportion: Proportion::Defined(0.0),
            },
        ]
    }

    #[test]
    fn undefined_is_an_empty_field() {
        let mut out = Vec::new();
        write_trajectories(&mut out, &records()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "species,date,proportion");
        assert_eq!(lines[2], "Wood Thrush,2022-01-11,");
        assert_eq!(lines[3], "Wood Thrush,2022-01-18,0.0");
    }

    #[test]
    fn reads_back_exact_values() {
        let mut out = Vec::new();
        write_trajectories(&mut out, &records()).unwrap();

        let read = read_trajectories(out.as_slice()).unwrap();
        assert_eq!(read, records());
        assert!(read[1].proportion.is_undefined());
    }

    #[test]
    fn writes_richness_rows() {
        let mut out = Vec::new();
        write_richness(
            &mut out,
            &[
                RichnessRecord { date: date(4), count: 2 },
                RichnessRecord { date: date(11), count: 0 },
            ],
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "date,count\n2022-01-04,2\n2022-01-11,0\n"
        );
    }
}
