//! NOAA nClimGrid county temperature fetcher.
//!
//! NOAA publishes one `.tar.gz` archive per month; inside each, the
//! `tavg-{year}{month}-cty-scaled.csv` member carries a row per county
//! with one column per day of the month, in degrees Celsius. Daily
//! values at or below −900 are missing-data markers. A county's monthly
//! mean is converted to Fahrenheit and the yearly figure is the mean of
//! whatever monthly means survived, with the month count kept so the
//! pipeline can judge coverage.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::io::Read;
use std::sync::Arc;

use county_compass_geography::names;
use county_compass_source_models::TemperatureRow;
use flate2::read::GzDecoder;
use tar::Archive;

use crate::SourceError;
use crate::progress::ProgressCallback;
use crate::retry;

/// Daily values at or below this are NOAA missing-data markers
/// (typically −999.99).
const MISSING_THRESHOLD: f64 = -900.0;

/// One county's mean for one month, already in Fahrenheit.
struct MonthlyMean {
    fips: String,
    name: String,
    mean_f: f64,
}

/// Accumulates a county's monthly means across the year.
struct CountyMonths {
    name: String,
    months: Vec<f64>,
}

/// Downloads the twelve monthly archives and reduces them to one
/// average-temperature row per county, sorted by FIPS.
///
/// `archive_urls` must be ordered January first; the month number used
/// to locate each archive's CSV member comes from the position.
///
/// # Errors
///
/// Returns [`SourceError`] when a download fails after retries or an
/// archive is missing its county CSV.
pub async fn fetch_temperatures(
    client: &reqwest::Client,
    archive_urls: &[String],
    year: u16,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<TemperatureRow>, SourceError> {
    progress.set_total(archive_urls.len() as u64);

    let mut counties: BTreeMap<String, CountyMonths> = BTreeMap::new();
    for (index, url) in archive_urls.iter().enumerate() {
        let month = index + 1;
        progress.set_message(format!("month {month:02}"));
        log::info!("Downloading nClimGrid archive {month}/{}", archive_urls.len());

        let bytes = retry::send_bytes(|| client.get(url)).await?;
        let member = format!("tavg-{year}{month:02}-cty-scaled.csv");
        let csv_text = extract_member(&bytes, &member)?;

        for MonthlyMean { fips, name, mean_f } in monthly_means(&csv_text) {
            counties
                .entry(fips)
                .or_insert_with(|| CountyMonths {
                    name,
                    months: Vec::new(),
                })
                .months
                .push(mean_f);
        }
        progress.inc(1);
    }

    Ok(yearly_rows(counties, year))
}

/// Reads one named member out of a gzipped tar archive held in memory.
fn extract_member(archive_bytes: &[u8], member_name: &str) -> Result<String, SourceError> {
    let decoder = GzDecoder::new(archive_bytes);
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.to_path_buf();
        if path.file_name().and_then(OsStr::to_str) == Some(member_name) {
            let mut contents = String::new();
            entry.read_to_string(&mut contents)?;
            return Ok(contents);
        }
    }

    Err(SourceError::UnexpectedPayload {
        message: format!("archive has no member named {member_name}"),
    })
}

/// Parses a monthly county CSV into per-county means.
///
/// Rows look like `cty,01001,"AL: Autauga",{year},{month},tavg,d1,...`
/// with daily readings from the seventh field on. Rows that are not
/// county rows, or that have no usable daily values, are dropped.
fn monthly_means(csv_text: &str) -> Vec<MonthlyMean> {
    let mut means = Vec::new();
    for line in csv_text.lines() {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 7 || fields[0].trim() != "cty" {
            continue;
        }
        let fips = fields[1].trim();
        let name = fields[2].trim().trim_matches('"');
        if fips.is_empty() {
            continue;
        }

        let daily: Vec<f64> = fields[6..]
            .iter()
            .filter_map(|field| field.trim().parse::<f64>().ok())
            .filter(|value| *value > MISSING_THRESHOLD)
            .collect();
        if daily.is_empty() {
            continue;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean_c = daily.iter().sum::<f64>() / daily.len() as f64;
        means.push(MonthlyMean {
            fips: fips.to_string(),
            name: name.to_string(),
            mean_f: celsius_to_fahrenheit(mean_c),
        });
    }
    means
}

/// Collapses accumulated monthly means into final rows, two-decimal
/// Fahrenheit, ordered by FIPS.
fn yearly_rows(counties: BTreeMap<String, CountyMonths>, year: u16) -> Vec<TemperatureRow> {
    counties
        .into_iter()
        .map(|(fips, county)| {
            #[allow(clippy::cast_precision_loss)]
            let mean = county.months.iter().sum::<f64>() / county.months.len() as f64;
            let state = names::split_state_prefix(&county.name)
                .map_or_else(String::new, |(abbr, _)| abbr.to_string());
            #[allow(clippy::cast_possible_truncation)]
            let months_with_data = county.months.len() as u8;
            TemperatureRow {
                fips,
                county: county.name,
                state,
                avg_temp_f: (mean * 100.0).round() / 100.0,
                months_with_data,
                year,
            }
        })
        .collect()
}

const fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
