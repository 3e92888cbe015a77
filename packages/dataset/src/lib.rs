#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed county dataset loading.
//!
//! [`load`] is the boundary where malformed data becomes a typed error.
//! Everything downstream of it (scoring, the API server, the terminal
//! explorer) assumes records are clean and never re-validates.

use std::collections::HashSet;
use std::path::Path;

use county_compass_county_models::CountyRecord;
use sha2::{Digest, Sha256};

/// Identifies one dataset build: the hex SHA-256 of the raw file bytes.
///
/// Two byte-identical files always get the same version, so the version
/// works as half of a `(dataset, configuration)` memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetVersion(String);

impl DatasetVersion {
    /// Computes the version of a raw dataset payload.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Sha256::digest(bytes)))
    }

    /// The version as a lowercase hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A loaded and validated dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All county records, in file order.
    pub counties: Vec<CountyRecord>,
    /// Version of the file the records came from.
    pub version: DatasetVersion,
}

/// Errors from loading or validating a dataset file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The file could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a JSON array of county records.
    #[error("dataset is not valid county JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The file parsed but contains no records.
    #[error("dataset contains no counties")]
    Empty,
    /// A record's FIPS code is not five ASCII digits.
    #[error("record {index}: malformed FIPS code {fips:?}")]
    MalformedFips {
        /// Zero-based position in the file.
        index: usize,
        /// The offending code.
        fips: String,
    },
    /// Two records share a FIPS code.
    #[error("duplicate FIPS code {fips}")]
    DuplicateFips {
        /// The repeated code.
        fips: String,
    },
    /// A numeric field is NaN, infinite, or negative where it must not be.
    #[error("county {fips}: {field} is {value}, expected a finite non-negative number")]
    InvalidValue {
        /// FIPS of the offending record.
        fips: String,
        /// Which field failed.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
}

/// Reads and validates a typed dataset file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a JSON array of
/// county records, or fails [`validate`].
pub fn load(path: &Path) -> Result<Dataset, DatasetError> {
    let bytes = std::fs::read(path)?;
    let counties: Vec<CountyRecord> = serde_json::from_slice(&bytes)?;
    validate(&counties)?;
    let version = DatasetVersion::from_bytes(&bytes);
    log::info!(
        "loaded {} counties from {} (version {version})",
        counties.len(),
        path.display(),
    );
    Ok(Dataset { counties, version })
}

/// Checks structural invariants over a slice of county records.
///
/// Records must be non-empty with unique five-digit FIPS codes, and every
/// floating-point field must be finite. Median age and vote percentages
/// must additionally be non-negative; average temperature may dip below
/// zero (Arctic boroughs). Vote totals are NOT required to equal the
/// democrat + republican sum, since totals include third-party votes.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate(counties: &[CountyRecord]) -> Result<(), DatasetError> {
    if counties.is_empty() {
        return Err(DatasetError::Empty);
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(counties.len());
    for (index, county) in counties.iter().enumerate() {
        if county.fips.len() != 5 || !county.fips.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DatasetError::MalformedFips {
                index,
                fips: county.fips.clone(),
            });
        }
        if !seen.insert(&county.fips) {
            return Err(DatasetError::DuplicateFips {
                fips: county.fips.clone(),
            });
        }

        check_non_negative(county, "medianAge", county.median_age)?;
        check_finite(county, "temperature.avgTempF", county.temperature.avg_temp_f)?;
        check_non_negative(county, "votes.percentages.democrat", county.votes.percentages.democrat)?;
        check_non_negative(
            county,
            "votes.percentages.republican",
            county.votes.percentages.republican,
        )?;
        if let Some(percent) = county.housing.percent_national_median {
            check_non_negative(county, "housing.percentNationalMedian", percent)?;
        }
    }

    Ok(())
}

fn check_finite(county: &CountyRecord, field: &'static str, value: f64) -> Result<(), DatasetError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DatasetError::InvalidValue {
            fips: county.fips.clone(),
            field,
            value,
        })
    }
}

fn check_non_negative(
    county: &CountyRecord,
    field: &'static str,
    value: f64,
) -> Result<(), DatasetError> {
    check_finite(county, field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(DatasetError::InvalidValue {
            fips: county.fips.clone(),
            field,
            value,
        })
    }
}
