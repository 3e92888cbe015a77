//! Typed CSV table reading and writing.
//!
//! Base tables are headered CSVs whose column names come straight from
//! the row structs in `county_compass_source_models`, so the on-disk
//! format is pinned by the types and nothing else.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::SourceError;

/// Writes `rows` as a headered CSV at `path`, creating parent
/// directories as needed.
///
/// # Errors
///
/// Returns an error when the directory cannot be created or a row
/// fails to serialize.
pub fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), SourceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a headered CSV at `path` into typed rows.
///
/// # Errors
///
/// Returns an error when the file cannot be opened or a row does not
/// match the expected columns.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SourceError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use county_compass_source_models::PopulationRow;

    use super::*;

    #[test]
    fn tables_roundtrip_with_stable_headers() {
        let dir = std::env::temp_dir().join("county_compass_tables_test");
        let path = dir.join("population_roundtrip.csv");
        let rows = vec![
            PopulationRow {
                fips: "01001".to_string(),
                county: "Autauga County, Alabama".to_string(),
                state: "Alabama".to_string(),
                population: 59_285,
                year: 2023,
            },
            PopulationRow {
                fips: "01003".to_string(),
                county: "Baldwin County, Alabama".to_string(),
                state: "Alabama".to_string(),
                population: 239_294,
                year: 2023,
            },
        ];

        write_table(&path, &rows).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("fips,county,state,population,year"));

        let back: Vec<PopulationRow> = read_table(&path).unwrap();
        assert_eq!(back, rows);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_table_is_an_error() {
        let path = std::env::temp_dir().join("county_compass_no_such_table.csv");
        let result: Result<Vec<PopulationRow>, _> = read_table(&path);
        assert!(result.is_err());
    }
}
