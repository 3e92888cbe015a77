//! County-level presidential election results fetcher.
//!
//! One CSV download covering every county, with raw vote counts per
//! party. Percentages are derived here (two decimals) rather than
//! trusted from the file, and the winner is whichever major party took
//! the larger share. Rows without a FIPS code or with zero total votes
//! are dropped.

use std::sync::Arc;

use county_compass_county_models::Party;
use county_compass_source_models::ElectionRow;

use crate::SourceError;
use crate::progress::ProgressCallback;
use crate::retry;

/// Downloads and normalizes the county results CSV, sorted by FIPS.
///
/// # Errors
///
/// Returns [`SourceError`] when the download fails after retries or the
/// CSV does not match the expected columns.
pub async fn fetch_elections(
    client: &reqwest::Client,
    url: &str,
    year: u16,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<ElectionRow>, SourceError> {
    progress.set_message("county results".to_string());
    log::info!("Downloading county election results: {url}");

    let text = retry::send_text(|| client.get(url)).await?;
    let rows = parse_results(&text, year)?;
    progress.inc(rows.len() as u64);
    Ok(rows)
}

/// Parses the county results CSV.
///
/// Column names follow the tonmcg county-results layout
/// (`county_fips`, `votes_gop`, `votes_dem`, `total_votes`, ...);
/// extra columns are ignored.
fn parse_results(csv_text: &str, year: u16) -> Result<Vec<ElectionRow>, SourceError> {
    #[derive(serde::Deserialize)]
    struct RawRow {
        state_name: String,
        county_fips: String,
        county_name: String,
        votes_gop: u64,
        votes_dem: u64,
        total_votes: u64,
    }

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    let mut rows = Vec::new();
    for raw in reader.deserialize() {
        let raw: RawRow = raw?;
        if raw.county_fips.trim().is_empty() || raw.total_votes == 0 {
            continue;
        }

        let democrat_percentage = percentage(raw.votes_dem, raw.total_votes);
        let republican_percentage = percentage(raw.votes_gop, raw.total_votes);
        let winner = if republican_percentage > democrat_percentage {
            Party::Republican
        } else {
            Party::Democrat
        };

        rows.push(ElectionRow {
            fips: raw.county_fips.trim().to_string(),
            county: raw.county_name,
            state: raw.state_name,
            total_votes: raw.total_votes,
            democrat_votes: raw.votes_dem,
            republican_votes: raw.votes_gop,
            democrat_percentage,
            republican_percentage,
            winner,
            year,
        });
    }

    rows.sort_by(|a, b| a.fips.cmp(&b.fips));
    Ok(rows)
}

/// Share of `votes` in `total`, rounded to two decimals.
///
/// Also used by the build pipeline to derive shares for estimate rows
/// that carry raw counts only.
#[must_use]
pub fn percentage(votes: u64, total: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let pct = votes as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "state_name,county_fips,county_name,votes_gop,votes_dem,total_votes,diff,per_point_diff";

    #[test]
    fn results_parse_with_derived_percentages() {
        let csv = format!(
            "{HEADER}\n\
             Alabama,01001,Autauga County,19838,7503,27770,12335,44.42\n\
             Alabama,01003,Baldwin County,83544,24578,109679,58966,53.76\n"
        );

        let rows = parse_results(&csv, 2024).unwrap();

        assert_eq!(rows.len(), 2);
        let autauga = &rows[0];
        assert_eq!(autauga.fips, "01001");
        assert_eq!(autauga.total_votes, 27_770);
        assert_eq!(autauga.winner, Party::Republican);
        assert!((autauga.republican_percentage - 71.44).abs() < f64::EPSILON);
        assert!((autauga.democrat_percentage - 27.02).abs() < f64::EPSILON);
        assert_eq!(autauga.year, 2024);
    }

    #[test]
    fn rows_without_fips_or_votes_are_dropped() {
        let csv = format!(
            "{HEADER}\n\
             Alabama,,Statewide,100,50,150,50,33.3\n\
             Alabama,01005,Barbour County,0,0,0,0,0\n\
             Alabama,01007,Bibb County,6,4,10,2,20.0\n"
        );

        let rows = parse_results(&csv, 2024).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].fips, "01007");
    }

    #[test]
    fn exact_ties_go_to_the_democrat_column() {
        let csv = format!("{HEADER}\nOhio,39001,Adams County,50,50,100,0,0\n");
        let rows = parse_results(&csv, 2024).unwrap();
        assert_eq!(rows[0].winner, Party::Democrat);
        assert!((rows[0].democrat_percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn output_is_sorted_by_fips() {
        let csv = format!(
            "{HEADER}\n\
             Texas,48001,Anderson County,10,5,15,5,33.3\n\
             Alabama,01001,Autauga County,10,5,15,5,33.3\n"
        );
        let rows = parse_results(&csv, 2024).unwrap();
        assert_eq!(rows[0].fips, "01001");
        assert_eq!(rows[1].fips, "48001");
    }
}
