//! Stage 3: convert merged rows into the typed dataset.
//!
//! A merged row graduates to a [`CountyRecord`] only when every metric
//! group is present; everything else is dropped and counted. Estimate
//! rows that carried raw vote counts get their percentages and winner
//! derived here, and every county's home value is expressed relative to
//! the dataset-wide median. The dataset is written alongside a manifest
//! recording what went into it.

use std::collections::BTreeMap;

use county_compass_county_models::{
    CountyRecord, Housing, Party, Rent, RentSizes, Temperature, VotePercentages, VoteTotals,
    Votes,
};
use county_compass_dataset::DatasetVersion;
use county_compass_scoring::stats;
use county_compass_source::elections;
use serde::{Deserialize, Serialize};

use crate::combine::MergedCounty;
use crate::{DataDirs, PipelineError};

/// Build provenance written next to the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetManifest {
    /// Counties in the dataset.
    pub record_count: u64,
    /// Rows each source table contributed to the merged input.
    pub source_rows: BTreeMap<String, u64>,
    /// Hex SHA-256 of the dataset file bytes; matches the loader's
    /// dataset version.
    pub sha256: String,
    /// RFC 3339 build time, UTC.
    pub built_at: String,
}

/// Converts merged rows into typed records, returning the records and
/// the count of rows dropped for missing a required metric group.
///
/// Vote percentages and winner are derived from the raw counts when the
/// row doesn't carry them; a row whose vote total is zero counts as
/// missing its election group. After conversion, each county's home
/// value is also expressed as a percentage of the dataset-wide median.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn build_records(counties: &[MergedCounty]) -> (Vec<CountyRecord>, usize) {
    let mut records: Vec<CountyRecord> = counties.iter().filter_map(typed_record).collect();
    let dropped = counties.len() - records.len();

    let home_values: Vec<f64> = records
        .iter()
        .map(|record| record.housing.median_home_value as f64)
        .collect();
    let national_median = stats::median(&home_values);
    if national_median > 0.0 {
        for record in &mut records {
            let percent = record.housing.median_home_value as f64 / national_median * 100.0;
            record.housing.percent_national_median = Some((percent * 100.0).round() / 100.0);
        }
    }

    (records, dropped)
}

fn typed_record(county: &MergedCounty) -> Option<CountyRecord> {
    let median_age = county.median_age?;
    let temperature = county.temperature?;
    let votes = county.votes?;
    let housing = county.housing?;
    let rent = county.rent?;
    if votes.total_votes == 0 {
        return None;
    }

    let percentages = VotePercentages {
        democrat: votes
            .democrat_percentage
            .unwrap_or_else(|| elections::percentage(votes.democrat_votes, votes.total_votes)),
        republican: votes
            .republican_percentage
            .unwrap_or_else(|| elections::percentage(votes.republican_votes, votes.total_votes)),
    };
    // The Republican share must be strictly higher to win; ties go to
    // the Democrat.
    let winner = votes.winner.unwrap_or_else(|| {
        if percentages.republican > percentages.democrat {
            Party::Republican
        } else {
            Party::Democrat
        }
    });

    Some(CountyRecord {
        fips: county.fips.clone(),
        name: county.name.clone(),
        state: county.state.clone(),
        population: county.population,
        median_age,
        temperature: Temperature {
            avg_temp_f: temperature.avg_temp_f,
            is_estimated: temperature.is_estimated,
        },
        votes: Votes {
            totals: VoteTotals {
                democrat: votes.democrat_votes,
                republican: votes.republican_votes,
                total: votes.total_votes,
            },
            percentages,
            winner,
            is_estimated: votes.is_estimated,
        },
        housing: Housing {
            median_home_value: housing.median_home_value,
            percent_national_median: None,
            is_estimated: housing.is_estimated,
        },
        rent: Rent {
            median_rent: rent.median_rent,
            // Missing unit sizes fall back to the median (two-bedroom)
            // rent.
            sizes: RentSizes {
                efficiency: rent.efficiency.unwrap_or(rent.median_rent),
                one_bedroom: rent.one_bedroom.unwrap_or(rent.median_rent),
                two_bedroom: rent.two_bedroom.unwrap_or(rent.median_rent),
                three_bedroom: rent.three_bedroom.unwrap_or(rent.median_rent),
                four_bedroom: rent.four_bedroom.unwrap_or(rent.median_rent),
            },
            is_estimated: rent.is_estimated,
        },
    })
}

/// Summarizes one build for the manifest.
#[must_use]
pub fn manifest(
    counties: &[MergedCounty],
    records: &[CountyRecord],
    dataset_bytes: &[u8],
) -> DatasetManifest {
    let count = |has: fn(&MergedCounty) -> bool| {
        counties.iter().filter(|county| has(county)).count() as u64
    };
    let mut source_rows = BTreeMap::new();
    source_rows.insert("population".to_string(), counties.len() as u64);
    source_rows.insert("median_ages".to_string(), count(|c| c.median_age.is_some()));
    source_rows.insert("temperatures".to_string(), count(|c| c.temperature.is_some()));
    source_rows.insert("elections".to_string(), count(|c| c.votes.is_some()));
    source_rows.insert("home_values".to_string(), count(|c| c.housing.is_some()));
    source_rows.insert("rents".to_string(), count(|c| c.rent.is_some()));

    DatasetManifest {
        record_count: records.len() as u64,
        source_rows,
        sha256: DatasetVersion::from_bytes(dataset_bytes).to_string(),
        built_at: chrono::Utc::now().to_rfc3339(),
    }
}

/// Runs the build stage: reads `final.json`, converts it, and writes
/// `dataset.json` plus `dataset.manifest.json`.
///
/// # Errors
///
/// Returns an error if `final.json` is missing or empty, or an output
/// cannot be written.
pub fn run(dirs: &DataDirs) -> Result<usize, PipelineError> {
    let merged_path = dirs.output.join("final.json");
    let counties: Vec<MergedCounty> = crate::read_json(&merged_path)?;
    if counties.is_empty() {
        return Err(PipelineError::EmptyInput { path: merged_path });
    }

    let (records, dropped) = build_records(&counties);
    if dropped > 0 {
        log::info!("dropped {dropped} counties missing a required metric group");
    }

    let dataset_bytes = serde_json::to_vec(&records)?;
    std::fs::create_dir_all(&dirs.output)?;
    let dataset_path = dirs.output.join("dataset.json");
    std::fs::write(&dataset_path, &dataset_bytes)?;

    let dataset_manifest = manifest(&counties, &records, &dataset_bytes);
    std::fs::write(
        dirs.output.join("dataset.manifest.json"),
        serde_json::to_vec_pretty(&dataset_manifest)?,
    )?;

    log::info!(
        "built {} county records at {} (version {})",
        records.len(),
        dataset_path.display(),
        dataset_manifest.sha256,
    );
    Ok(records.len())
}
