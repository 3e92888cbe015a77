//! Stage 1: merge the six base tables into one row per county.
//!
//! Population rows are the spine: every output row started as a
//! population row, minus Puerto Rico (FIPS prefix 72), which the
//! temperature and rent providers do not cover. Median ages, home
//! values, and election results join by FIPS alone. Temperatures and
//! rents join by FIPS with a normalized-name fallback, because those
//! tables carry looser county identifiers (`"AL: Autauga"` labels,
//! legacy entity codes).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use county_compass_county_models::Party;
use county_compass_geography::{fips, names};
use county_compass_source::{registry, tables};
use county_compass_source_models::{
    ElectionRow, HomeValueRow, MedianAgeRow, PopulationRow, RentRow, TemperatureRow,
};
use serde::{Deserialize, Serialize};

use crate::{DataDirs, PipelineError};

/// Temperature attached to a merged row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedTemperature {
    /// Annual average, °F.
    pub avg_temp_f: f64,
    /// True when the value came from the fill stage.
    pub is_estimated: bool,
}

/// Election results attached to a merged row.
///
/// Percentages and winner are present when the source table carried them
/// precomputed; estimate overlays carry raw counts only and leave the
/// derivation to the build stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedVotes {
    /// Democratic candidate votes.
    pub democrat_votes: u64,
    /// Republican candidate votes.
    pub republican_votes: u64,
    /// All votes cast, including third-party.
    pub total_votes: u64,
    /// Democratic share of the total, if precomputed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub democrat_percentage: Option<f64>,
    /// Republican share of the total, if precomputed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub republican_percentage: Option<f64>,
    /// Winning party, if precomputed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Party>,
    /// True when the results came from the fill stage.
    pub is_estimated: bool,
}

/// Home value attached to a merged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedHousing {
    /// Median home value, dollars.
    pub median_home_value: u64,
    /// True when the value came from the fill stage.
    pub is_estimated: bool,
}

/// Rent figures attached to a merged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRent {
    /// Two-bedroom fair market rent, dollars per month.
    pub median_rent: u64,
    /// Efficiency (studio) FMR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<u64>,
    /// One-bedroom FMR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_bedroom: Option<u64>,
    /// Two-bedroom FMR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_bedroom: Option<u64>,
    /// Three-bedroom FMR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub three_bedroom: Option<u64>,
    /// Four-bedroom FMR.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub four_bedroom: Option<u64>,
    /// True when the values came from the fill stage.
    pub is_estimated: bool,
}

/// One county's merged row.
///
/// Groups no source table covered stay `None` until the fill stage
/// overlays an estimate; counties still missing a group after that are
/// dropped by the build stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedCounty {
    /// Zero-padded 5-digit county FIPS.
    pub fips: String,
    /// County name without the state tail, e.g. `"Autauga County"`.
    pub name: String,
    /// Full state name.
    pub state: String,
    /// Total population.
    pub population: u64,
    /// Median age in years.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_age: Option<f64>,
    /// Temperature group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<MergedTemperature>,
    /// Election results group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<MergedVotes>,
    /// Home value group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<MergedHousing>,
    /// Rent group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<MergedRent>,
}

/// The six raw tables the combine stage joins.
#[derive(Debug, Clone, Default)]
pub struct BaseTables {
    /// Census population table (the spine).
    pub population: Vec<PopulationRow>,
    /// Census median age table.
    pub median_ages: Vec<MedianAgeRow>,
    /// Census home value table.
    pub home_values: Vec<HomeValueRow>,
    /// NOAA temperature table.
    pub temperatures: Vec<TemperatureRow>,
    /// HUD rent table.
    pub rents: Vec<RentRow>,
    /// Election results table.
    pub elections: Vec<ElectionRow>,
}

impl BaseTables {
    /// Loads all six tables from the base directory, resolving each
    /// filename through the source registry.
    ///
    /// # Errors
    ///
    /// Returns an error if any table is missing or unreadable, or if the
    /// population table has no rows.
    pub fn load(base_dir: &Path) -> Result<Self, PipelineError> {
        let population_path = table_path(base_dir, "census_population")?;
        let population = tables::read_table(&population_path)?;
        if population.is_empty() {
            return Err(PipelineError::EmptyInput {
                path: population_path,
            });
        }
        Ok(Self {
            population,
            median_ages: tables::read_table(&table_path(base_dir, "census_median_age")?)?,
            home_values: tables::read_table(&table_path(base_dir, "census_home_value")?)?,
            temperatures: tables::read_table(&table_path(base_dir, "noaa_temperatures")?)?,
            rents: tables::read_table(&table_path(base_dir, "hud_rents")?)?,
            elections: tables::read_table(&table_path(base_dir, "county_elections")?)?,
        })
    }
}

fn table_path(base_dir: &Path, id: &str) -> Result<PathBuf, PipelineError> {
    registry::source_by_id(id)
        .map(|source| base_dir.join(source.output_filename))
        .ok_or_else(|| PipelineError::UnknownSource { id: id.to_string() })
}

/// Indexes rows by normalized 5-digit FIPS. Rows whose FIPS cannot be
/// normalized are unreachable by FIPS lookup and simply left out.
pub(crate) fn fips_index<'a, T>(rows: &'a [T], fips_of: fn(&T) -> &str) -> BTreeMap<String, &'a T> {
    rows.iter()
        .filter_map(|row| fips::normalize_county_fips(fips_of(row)).map(|code| (code, row)))
        .collect()
}

/// Indexes rows by the normalized `"{county}|{state}"` name key.
pub(crate) fn name_index<'a, T>(rows: &'a [T], key_of: fn(&T) -> String) -> BTreeMap<String, &'a T> {
    rows.iter().map(|row| (key_of(row), row)).collect()
}

/// Merges the six tables into one row per county.
///
/// Pure over its input; logs per-table coverage as a side effect.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn merge(tables: &BaseTables) -> Vec<MergedCounty> {
    let ages = fips_index(&tables.median_ages, |row| &row.fips);
    let homes = fips_index(&tables.home_values, |row| &row.fips);
    let elections = fips_index(&tables.elections, |row| &row.fips);
    let temps = fips_index(&tables.temperatures, |row| &row.fips);
    let temps_by_name = name_index(&tables.temperatures, |row| {
        names::county_key(&row.county, &row.state)
    });
    let rents = fips_index(&tables.rents, |row| &row.fips);
    let rents_by_name = name_index(&tables.rents, |row| {
        names::county_key(&row.county, &row.state)
    });

    let mut counties = Vec::with_capacity(tables.population.len());
    let mut excluded_puerto_rico = 0usize;

    for row in &tables.population {
        let Some(county_fips) = fips::normalize_county_fips(&row.fips) else {
            log::warn!("skipping population row with unusable FIPS {:?}", row.fips);
            continue;
        };
        if fips::is_puerto_rico(&county_fips) {
            excluded_puerto_rico += 1;
            continue;
        }

        let name = row
            .county
            .split_once(',')
            .map_or(row.county.as_str(), |(head, _)| head)
            .trim()
            .to_string();
        let name_key = names::county_key(&row.county, &row.state);

        let median_age = ages.get(&county_fips).map(|age| age.median_age);
        let housing = homes.get(&county_fips).map(|home| MergedHousing {
            median_home_value: home.median_home_value,
            is_estimated: false,
        });
        let votes = elections.get(&county_fips).map(|result| MergedVotes {
            democrat_votes: result.democrat_votes,
            republican_votes: result.republican_votes,
            total_votes: result.total_votes,
            democrat_percentage: Some(result.democrat_percentage),
            republican_percentage: Some(result.republican_percentage),
            winner: Some(result.winner),
            is_estimated: false,
        });
        let temperature = temps
            .get(&county_fips)
            .or_else(|| temps_by_name.get(&name_key))
            .map(|temp| MergedTemperature {
                avg_temp_f: temp.avg_temp_f,
                is_estimated: false,
            });
        let rent = rents
            .get(&county_fips)
            .or_else(|| rents_by_name.get(&name_key))
            .map(|rent| MergedRent {
                median_rent: rent.median_rent,
                efficiency: rent.efficiency,
                one_bedroom: rent.one_bedroom,
                two_bedroom: rent.two_bedroom,
                three_bedroom: rent.three_bedroom,
                four_bedroom: rent.four_bedroom,
                is_estimated: false,
            });

        counties.push(MergedCounty {
            fips: county_fips,
            name,
            state: row.state.clone(),
            population: row.population,
            median_age,
            temperature,
            votes,
            housing,
            rent,
        });
    }

    if excluded_puerto_rico > 0 {
        log::info!("excluded {excluded_puerto_rico} Puerto Rico municipios");
    }
    log_coverage(&counties);
    counties
}

/// Logs how many counties carry each metric group.
pub(crate) fn log_coverage(counties: &[MergedCounty]) {
    let total = counties.len();
    let count = |has: fn(&MergedCounty) -> bool| counties.iter().filter(|c| has(c)).count();
    log::info!("{total} counties:");
    log::info!("  median age  {}/{total}", count(|c| c.median_age.is_some()));
    log::info!("  temperature {}/{total}", count(|c| c.temperature.is_some()));
    log::info!("  elections   {}/{total}", count(|c| c.votes.is_some()));
    log::info!("  home values {}/{total}", count(|c| c.housing.is_some()));
    log::info!("  rents       {}/{total}", count(|c| c.rent.is_some()));
}

/// Runs the combine stage: loads the base tables, merges them, and
/// writes `base.json` and `base.csv` under the output directory.
///
/// # Errors
///
/// Returns an error if a base table cannot be loaded or an output cannot
/// be written.
pub fn run(dirs: &DataDirs) -> Result<usize, PipelineError> {
    let base_tables = BaseTables::load(&dirs.base)?;
    let counties = merge(&base_tables);
    crate::write_json(&dirs.output.join("base.json"), &counties)?;
    tables::write_table(&dirs.output.join("base.csv"), &flat_rows(&counties))?;
    Ok(counties.len())
}

/// Flattened merged row for the CSV twin of `base.json`.
#[derive(Debug, Serialize)]
struct FlatRow<'a> {
    fips: &'a str,
    name: &'a str,
    state: &'a str,
    population: u64,
    median_age: Option<f64>,
    avg_temp_f: Option<f64>,
    temperature_estimated: Option<bool>,
    democrat_votes: Option<u64>,
    republican_votes: Option<u64>,
    total_votes: Option<u64>,
    democrat_percentage: Option<f64>,
    republican_percentage: Option<f64>,
    winner: Option<Party>,
    votes_estimated: Option<bool>,
    median_home_value: Option<u64>,
    housing_estimated: Option<bool>,
    median_rent: Option<u64>,
    efficiency: Option<u64>,
    one_bedroom: Option<u64>,
    two_bedroom: Option<u64>,
    three_bedroom: Option<u64>,
    four_bedroom: Option<u64>,
    rent_estimated: Option<bool>,
}

fn flat_rows(counties: &[MergedCounty]) -> Vec<FlatRow<'_>> {
    counties
        .iter()
        .map(|county| FlatRow {
            fips: &county.fips,
            name: &county.name,
            state: &county.state,
            population: county.population,
            median_age: county.median_age,
            avg_temp_f: county.temperature.map(|t| t.avg_temp_f),
            temperature_estimated: county.temperature.map(|t| t.is_estimated),
            democrat_votes: county.votes.map(|v| v.democrat_votes),
            republican_votes: county.votes.map(|v| v.republican_votes),
            total_votes: county.votes.map(|v| v.total_votes),
            democrat_percentage: county.votes.and_then(|v| v.democrat_percentage),
            republican_percentage: county.votes.and_then(|v| v.republican_percentage),
            winner: county.votes.and_then(|v| v.winner),
            votes_estimated: county.votes.map(|v| v.is_estimated),
            median_home_value: county.housing.map(|h| h.median_home_value),
            housing_estimated: county.housing.map(|h| h.is_estimated),
            median_rent: county.rent.map(|r| r.median_rent),
            efficiency: county.rent.and_then(|r| r.efficiency),
            one_bedroom: county.rent.and_then(|r| r.one_bedroom),
            two_bedroom: county.rent.and_then(|r| r.two_bedroom),
            three_bedroom: county.rent.and_then(|r| r.three_bedroom),
            four_bedroom: county.rent.and_then(|r| r.four_bedroom),
            rent_estimated: county.rent.map(|r| r.is_estimated),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population_row(fips: &str, county: &str, state: &str, population: u64) -> PopulationRow {
        PopulationRow {
            fips: fips.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            population,
            year: 2023,
        }
    }

    fn age_row(fips: &str, median_age: f64) -> MedianAgeRow {
        MedianAgeRow {
            fips: fips.to_string(),
            county: "Ignored".to_string(),
            state: "Ignored".to_string(),
            median_age,
            year: 2023,
        }
    }

    fn home_row(fips: &str, value: u64) -> HomeValueRow {
        HomeValueRow {
            fips: fips.to_string(),
            county: "Ignored".to_string(),
            state: "Ignored".to_string(),
            median_home_value: value,
            year: 2023,
        }
    }

    fn temperature_row(fips: &str, county: &str, state: &str, avg: f64) -> TemperatureRow {
        TemperatureRow {
            fips: fips.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            avg_temp_f: avg,
            months_with_data: 12,
            year: 2023,
        }
    }

    fn rent_row(fips: &str, county: &str, state: &str, rent: u64) -> RentRow {
        RentRow {
            fips: fips.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            median_rent: rent,
            efficiency: Some(rent - 300),
            one_bedroom: Some(rent - 200),
            two_bedroom: Some(rent),
            three_bedroom: Some(rent + 300),
            four_bedroom: None,
            year: 2023,
        }
    }

    fn election_row(fips: &str, democrat: u64, republican: u64, total: u64) -> ElectionRow {
        ElectionRow {
            fips: fips.to_string(),
            county: "Ignored".to_string(),
            state: "Ignored".to_string(),
            total_votes: total,
            democrat_votes: democrat,
            republican_votes: republican,
            democrat_percentage: 27.02,
            republican_percentage: 71.44,
            winner: Party::Republican,
            year: 2024,
        }
    }

    #[test]
    fn population_rows_are_the_spine() {
        let tables = BaseTables {
            population: vec![
                population_row("01001", "Autauga County, Alabama", "Alabama", 59_285),
                population_row("01003", "Baldwin County, Alabama", "Alabama", 239_294),
            ],
            ..Default::default()
        };
        let counties = merge(&tables);
        assert_eq!(counties.len(), 2);
        assert_eq!(counties[0].fips, "01001");
        assert_eq!(counties[0].name, "Autauga County");
        assert_eq!(counties[0].state, "Alabama");
        assert!(counties[0].median_age.is_none());
        assert!(counties[0].temperature.is_none());
        assert!(counties[0].votes.is_none());
        assert!(counties[0].housing.is_none());
        assert!(counties[0].rent.is_none());
    }

    #[test]
    fn puerto_rico_is_excluded() {
        let tables = BaseTables {
            population: vec![
                population_row("01001", "Autauga County, Alabama", "Alabama", 59_285),
                population_row("72001", "Adjuntas Municipio, Puerto Rico", "Puerto Rico", 18_020),
            ],
            ..Default::default()
        };
        let counties = merge(&tables);
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].fips, "01001");
    }

    #[test]
    fn fips_joins_attach_groups() {
        let tables = BaseTables {
            population: vec![population_row(
                "01001",
                "Autauga County, Alabama",
                "Alabama",
                59_285,
            )],
            median_ages: vec![age_row("01001", 38.6)],
            home_values: vec![home_row("01001", 203_300)],
            elections: vec![election_row("01001", 7_503, 19_838, 27_770)],
            ..Default::default()
        };
        let counties = merge(&tables);
        let county = &counties[0];
        assert_eq!(county.median_age, Some(38.6));
        assert_eq!(
            county.housing,
            Some(MergedHousing {
                median_home_value: 203_300,
                is_estimated: false,
            })
        );
        let votes = county.votes.unwrap();
        assert_eq!(votes.total_votes, 27_770);
        assert_eq!(votes.winner, Some(Party::Republican));
        assert_eq!(votes.democrat_percentage, Some(27.02));
        assert!(!votes.is_estimated);
    }

    #[test]
    fn temperature_falls_back_to_the_name_key() {
        // The NOAA row carries a FIPS that matches nothing, but its
        // "AL: Autauga" label normalizes to the same key as the census
        // county name.
        let tables = BaseTables {
            population: vec![population_row(
                "01001",
                "Autauga County, Alabama",
                "Alabama",
                59_285,
            )],
            temperatures: vec![temperature_row("99001", "AL: Autauga", "AL", 64.4)],
            ..Default::default()
        };
        let counties = merge(&tables);
        assert_eq!(
            counties[0].temperature,
            Some(MergedTemperature {
                avg_temp_f: 64.4,
                is_estimated: false,
            })
        );
    }

    #[test]
    fn rent_falls_back_to_the_name_key() {
        let tables = BaseTables {
            population: vec![population_row(
                "01001",
                "Autauga County, Alabama",
                "Alabama",
                59_285,
            )],
            rents: vec![rent_row("99001", "Autauga County", "AL", 1_171)],
            ..Default::default()
        };
        let counties = merge(&tables);
        let rent = counties[0].rent.unwrap();
        assert_eq!(rent.median_rent, 1_171);
        assert_eq!(rent.four_bedroom, None);
    }

    #[test]
    fn fips_match_wins_over_the_name_key() {
        let tables = BaseTables {
            population: vec![population_row(
                "01001",
                "Autauga County, Alabama",
                "Alabama",
                59_285,
            )],
            temperatures: vec![
                temperature_row("01001", "AL: Somewhere Else", "AL", 60.0),
                temperature_row("99001", "AL: Autauga", "AL", 99.0),
            ],
            ..Default::default()
        };
        let counties = merge(&tables);
        assert_eq!(counties[0].temperature.unwrap().avg_temp_f, 60.0);
    }

    #[test]
    fn short_fips_codes_are_normalized_before_joining() {
        let tables = BaseTables {
            population: vec![population_row("1001", "Autauga County, Alabama", "Alabama", 59_285)],
            median_ages: vec![age_row("1001", 38.6)],
            ..Default::default()
        };
        let counties = merge(&tables);
        assert_eq!(counties[0].fips, "01001");
        assert_eq!(counties[0].median_age, Some(38.6));
    }

    #[test]
    fn run_writes_base_artifacts() {
        let root = std::env::temp_dir().join("county_compass_combine_run_test");
        let _ = std::fs::remove_dir_all(&root);
        let dirs = DataDirs::new(&root);

        tables::write_table(
            &dirs.base.join("population_2023.csv"),
            &[population_row("01001", "Autauga County, Alabama", "Alabama", 59_285)],
        )
        .unwrap();
        tables::write_table(&dirs.base.join("median_ages_2023.csv"), &[age_row("01001", 38.6)])
            .unwrap();
        tables::write_table(&dirs.base.join("housing_2023.csv"), &Vec::<HomeValueRow>::new())
            .unwrap();
        tables::write_table(
            &dirs.base.join("temperatures_2023.csv"),
            &[temperature_row("01001", "AL: Autauga", "AL", 64.4)],
        )
        .unwrap();
        tables::write_table(&dirs.base.join("rents_2023.csv"), &Vec::<RentRow>::new()).unwrap();
        tables::write_table(
            &dirs.base.join("elections_2024.csv"),
            &Vec::<ElectionRow>::new(),
        )
        .unwrap();

        let count = run(&dirs).unwrap();
        assert_eq!(count, 1);

        let counties: Vec<MergedCounty> =
            crate::read_json(&dirs.output.join("base.json")).unwrap();
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].fips, "01001");
        assert_eq!(counties[0].median_age, Some(38.6));
        assert!(counties[0].housing.is_none());

        let csv_text = std::fs::read_to_string(dirs.output.join("base.csv")).unwrap();
        assert!(csv_text.starts_with("fips,name,state,population"));
    }
}
