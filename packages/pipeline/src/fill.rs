//! Stage 2: overlay hand-curated estimates onto the combined rows.
//!
//! Some counties never appear in a provider's table (Alaska boroughs in
//! the election results, Connecticut planning regions in the HUD rents).
//! The fill stage patches those holes from small, hand-maintained CSV
//! tables under `data/fill/`. Population and median age are never
//! estimated; a county the Census doesn't know is not a county we score.
//!
//! Every overlaid group is flagged estimated so the provenance survives
//! all the way into the served dataset.

use std::path::Path;

use county_compass_geography::names;
use county_compass_source::tables;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::combine::{
    self, MergedCounty, MergedHousing, MergedRent, MergedTemperature, MergedVotes,
    fips_index, name_index,
};
use crate::{DataDirs, PipelineError};

/// Hand-curated temperature estimate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureEstimateRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name, any of the recognized label forms.
    pub county: String,
    /// State name or abbreviation.
    pub state: String,
    /// Estimated annual average, °F.
    pub avg_temp_f: f64,
}

/// Hand-curated election estimate row. Raw counts only; percentages and
/// winner are derived in the build stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionEstimateRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name.
    pub county: String,
    /// State name or abbreviation.
    pub state: String,
    /// All votes cast.
    pub total_votes: u64,
    /// Democratic candidate votes.
    pub democrat_votes: u64,
    /// Republican candidate votes.
    pub republican_votes: u64,
}

/// Hand-curated rent estimate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentEstimateRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name.
    pub county: String,
    /// State name or abbreviation.
    pub state: String,
    /// Estimated two-bedroom rent, dollars per month.
    pub median_rent: u64,
    /// Efficiency (studio) rent.
    pub efficiency: Option<u64>,
    /// One-bedroom rent.
    pub one_bedroom: Option<u64>,
    /// Two-bedroom rent.
    pub two_bedroom: Option<u64>,
    /// Three-bedroom rent.
    pub three_bedroom: Option<u64>,
    /// Four-bedroom rent.
    pub four_bedroom: Option<u64>,
}

/// Hand-curated home value estimate row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousingEstimateRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name.
    pub county: String,
    /// State name or abbreviation.
    pub state: String,
    /// Estimated median home value, dollars.
    pub median_home_value: u64,
}

/// The optional estimate tables. A missing file is an empty table, not
/// an error.
#[derive(Debug, Clone, Default)]
pub struct FillTables {
    /// Temperature estimates.
    pub temperatures: Vec<TemperatureEstimateRow>,
    /// Election estimates.
    pub elections: Vec<ElectionEstimateRow>,
    /// Rent estimates (`rents_filled.csv` then `rents_estimates.csv`,
    /// concatenated in that order).
    pub rents: Vec<RentEstimateRow>,
    /// Home value estimates.
    pub home_values: Vec<HousingEstimateRow>,
}

impl FillTables {
    /// Loads whichever estimate tables exist under the fill directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a table that exists cannot be parsed.
    pub fn load(fill_dir: &Path) -> Result<Self, PipelineError> {
        let mut rents: Vec<RentEstimateRow> =
            optional_table(&fill_dir.join("rents_filled.csv"))?;
        rents.extend(optional_table::<RentEstimateRow>(
            &fill_dir.join("rents_estimates.csv"),
        )?);
        Ok(Self {
            temperatures: optional_table(&fill_dir.join("temperatures_estimates.csv"))?,
            elections: optional_table(&fill_dir.join("elections_estimates.csv"))?,
            rents,
            home_values: optional_table(&fill_dir.join("housing_estimates.csv"))?,
        })
    }
}

fn optional_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PipelineError> {
    if path.exists() {
        Ok(tables::read_table(path)?)
    } else {
        log::info!("no estimates at {}", path.display());
        Ok(Vec::new())
    }
}

/// One applied overlay, as written to `fill.json`: the county's identity
/// plus only the groups that were filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFill {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name.
    pub name: String,
    /// Full state name.
    pub state: String,
    /// Filled temperature group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<MergedTemperature>,
    /// Filled election group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<MergedVotes>,
    /// Filled home value group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing: Option<MergedHousing>,
    /// Filled rent group, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent: Option<MergedRent>,
}

impl AppliedFill {
    const fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.votes.is_none()
            && self.housing.is_none()
            && self.rent.is_none()
    }
}

/// Overlays estimates onto counties missing a metric group, returning
/// one entry per county that was changed.
///
/// Matching is FIPS-first for every table. Temperatures and rents fall
/// back to the normalized name key, mirroring the combine-stage joins;
/// elections and home values match by FIPS only. A group the combine
/// stage already populated is never overwritten.
pub fn apply(counties: &mut [MergedCounty], estimates: &FillTables) -> Vec<AppliedFill> {
    let temps = fips_index(&estimates.temperatures, |row| &row.fips);
    let temps_by_name = name_index(&estimates.temperatures, |row| {
        names::county_key(&row.county, &row.state)
    });
    let elections = fips_index(&estimates.elections, |row| &row.fips);
    let rents = fips_index(&estimates.rents, |row| &row.fips);
    let rents_by_name = name_index(&estimates.rents, |row| {
        names::county_key(&row.county, &row.state)
    });
    let homes = fips_index(&estimates.home_values, |row| &row.fips);

    let mut applied = Vec::new();

    for county in &mut *counties {
        let name_key = names::county_key(&county.name, &county.state);
        let mut entry = AppliedFill {
            fips: county.fips.clone(),
            name: county.name.clone(),
            state: county.state.clone(),
            temperature: None,
            votes: None,
            housing: None,
            rent: None,
        };

        if county.temperature.is_none() {
            if let Some(row) = temps
                .get(&county.fips)
                .or_else(|| temps_by_name.get(&name_key))
            {
                let filled = MergedTemperature {
                    avg_temp_f: row.avg_temp_f,
                    is_estimated: true,
                };
                county.temperature = Some(filled);
                entry.temperature = Some(filled);
            }
        }
        if county.votes.is_none() {
            if let Some(row) = elections.get(&county.fips) {
                let filled = MergedVotes {
                    democrat_votes: row.democrat_votes,
                    republican_votes: row.republican_votes,
                    total_votes: row.total_votes,
                    democrat_percentage: None,
                    republican_percentage: None,
                    winner: None,
                    is_estimated: true,
                };
                county.votes = Some(filled);
                entry.votes = Some(filled);
            }
        }
        if county.housing.is_none() {
            if let Some(row) = homes.get(&county.fips) {
                let filled = MergedHousing {
                    median_home_value: row.median_home_value,
                    is_estimated: true,
                };
                county.housing = Some(filled);
                entry.housing = Some(filled);
            }
        }
        if county.rent.is_none() {
            if let Some(row) = rents
                .get(&county.fips)
                .or_else(|| rents_by_name.get(&name_key))
            {
                let filled = MergedRent {
                    median_rent: row.median_rent,
                    efficiency: row.efficiency,
                    one_bedroom: row.one_bedroom,
                    two_bedroom: row.two_bedroom,
                    three_bedroom: row.three_bedroom,
                    four_bedroom: row.four_bedroom,
                    is_estimated: true,
                };
                county.rent = Some(filled);
                entry.rent = Some(filled);
            }
        }

        if !entry.is_empty() {
            applied.push(entry);
        }
    }

    log_applied(&applied);
    applied
}

fn log_applied(applied: &[AppliedFill]) {
    let count = |has: fn(&AppliedFill) -> bool| applied.iter().filter(|f| has(f)).count();
    log::info!("filled {} counties from estimates:", applied.len());
    log::info!("  temperature {}", count(|f| f.temperature.is_some()));
    log::info!("  elections   {}", count(|f| f.votes.is_some()));
    log::info!("  home values {}", count(|f| f.housing.is_some()));
    log::info!("  rents       {}", count(|f| f.rent.is_some()));
}

/// Runs the fill stage: reads `base.json`, overlays whatever estimate
/// tables exist, and writes `fill.json` (the applied overlays) and
/// `final.json` (the merged result).
///
/// # Errors
///
/// Returns an error if `base.json` is missing, an estimate table cannot
/// be parsed, or an output cannot be written.
pub fn run(dirs: &DataDirs) -> Result<usize, PipelineError> {
    let mut counties: Vec<MergedCounty> = crate::read_json(&dirs.output.join("base.json"))?;
    let estimates = FillTables::load(&dirs.fill)?;
    let applied = apply(&mut counties, &estimates);
    crate::write_json(&dirs.output.join("fill.json"), &applied)?;
    crate::write_json(&dirs.output.join("final.json"), &counties)?;
    combine::log_coverage(&counties);
    Ok(applied.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn county(fips: &str, name: &str, state: &str) -> MergedCounty {
        MergedCounty {
            fips: fips.to_string(),
            name: name.to_string(),
            state: state.to_string(),
            population: 10_000,
            median_age: Some(40.0),
            temperature: None,
            votes: None,
            housing: None,
            rent: None,
        }
    }

    fn temperature_estimate(fips: &str, county: &str, state: &str, avg: f64) -> TemperatureEstimateRow {
        TemperatureEstimateRow {
            fips: fips.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            avg_temp_f: avg,
        }
    }

    fn election_estimate(fips: &str) -> ElectionEstimateRow {
        ElectionEstimateRow {
            fips: fips.to_string(),
            county: "Ignored".to_string(),
            state: "Ignored".to_string(),
            total_votes: 1_000,
            democrat_votes: 600,
            republican_votes: 380,
        }
    }

    fn rent_estimate(fips: &str, county: &str, state: &str, rent: u64) -> RentEstimateRow {
        RentEstimateRow {
            fips: fips.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            median_rent: rent,
            efficiency: None,
            one_bedroom: None,
            two_bedroom: Some(rent),
            three_bedroom: None,
            four_bedroom: None,
        }
    }

    #[test]
    fn fills_missing_groups_and_marks_them_estimated() {
        let mut counties = vec![county("02185", "North Slope Borough", "Alaska")];
        let estimates = FillTables {
            temperatures: vec![temperature_estimate("02185", "North Slope Borough", "AK", 12.4)],
            elections: vec![election_estimate("02185")],
            ..Default::default()
        };

        let applied = apply(&mut counties, &estimates);

        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].fips, "02185");
        let temperature = counties[0].temperature.unwrap();
        assert_eq!(temperature.avg_temp_f, 12.4);
        assert!(temperature.is_estimated);
        let votes = counties[0].votes.unwrap();
        assert_eq!(votes.democrat_votes, 600);
        assert!(votes.is_estimated);
        assert_eq!(votes.winner, None);
        assert!(counties[0].housing.is_none());
        assert!(counties[0].rent.is_none());
    }

    #[test]
    fn existing_groups_are_never_overwritten() {
        let mut counties = vec![county("01001", "Autauga County", "Alabama")];
        counties[0].temperature = Some(MergedTemperature {
            avg_temp_f: 64.4,
            is_estimated: false,
        });
        let estimates = FillTables {
            temperatures: vec![temperature_estimate("01001", "Autauga County", "AL", 99.0)],
            ..Default::default()
        };

        let applied = apply(&mut counties, &estimates);

        assert!(applied.is_empty());
        let temperature = counties[0].temperature.unwrap();
        assert_eq!(temperature.avg_temp_f, 64.4);
        assert!(!temperature.is_estimated);
    }

    #[test]
    fn temperatures_and_rents_match_by_name_fallback() {
        let mut counties = vec![county("09110", "Capitol Planning Region", "Connecticut")];
        let estimates = FillTables {
            temperatures: vec![temperature_estimate(
                "99999",
                "CT: Capitol Planning Region",
                "CT",
                50.2,
            )],
            rents: vec![rent_estimate("99999", "Capitol Planning Region", "CT", 1_450)],
            ..Default::default()
        };

        let applied = apply(&mut counties, &estimates);

        assert_eq!(applied.len(), 1);
        assert_eq!(counties[0].temperature.unwrap().avg_temp_f, 50.2);
        assert_eq!(counties[0].rent.unwrap().median_rent, 1_450);
    }

    #[test]
    fn elections_never_match_by_name() {
        let mut counties = vec![county("02185", "North Slope Borough", "Alaska")];
        let mut estimate = election_estimate("99999");
        estimate.county = "North Slope Borough".to_string();
        estimate.state = "AK".to_string();
        let estimates = FillTables {
            elections: vec![estimate],
            ..Default::default()
        };

        let applied = apply(&mut counties, &estimates);

        assert!(applied.is_empty());
        assert!(counties[0].votes.is_none());
    }

    #[test]
    fn run_reads_base_and_writes_fill_artifacts() {
        let root = std::env::temp_dir().join("county_compass_fill_run_test");
        let _ = std::fs::remove_dir_all(&root);
        let dirs = DataDirs::new(&root);

        let base = vec![county("02185", "North Slope Borough", "Alaska")];
        crate::write_json(&dirs.output.join("base.json"), &base).unwrap();
        tables::write_table(
            &dirs.fill.join("temperatures_estimates.csv"),
            &[temperature_estimate("02185", "North Slope Borough", "AK", 12.4)],
        )
        .unwrap();

        let filled = run(&dirs).unwrap();
        assert_eq!(filled, 1);

        let applied: Vec<AppliedFill> = crate::read_json(&dirs.output.join("fill.json")).unwrap();
        assert_eq!(applied.len(), 1);
        assert!(applied[0].temperature.is_some());
        assert!(applied[0].rent.is_none());

        let merged: Vec<MergedCounty> =
            crate::read_json(&dirs.output.join("final.json")).unwrap();
        assert!(merged[0].temperature.unwrap().is_estimated);
    }

    #[test]
    fn missing_estimate_files_load_as_empty_tables() {
        let root = std::env::temp_dir().join("county_compass_fill_missing_test");
        let _ = std::fs::remove_dir_all(&root);
        let estimates = FillTables::load(&root.join("fill")).unwrap();
        assert!(estimates.temperatures.is_empty());
        assert!(estimates.elections.is_empty());
        assert!(estimates.rents.is_empty());
        assert!(estimates.home_values.is_empty());
    }

    #[test]
    fn rent_estimate_tables_are_concatenated() {
        let root = std::env::temp_dir().join("county_compass_fill_concat_test");
        let _ = std::fs::remove_dir_all(&root);
        let fill_dir = root.join("fill");

        tables::write_table(
            &fill_dir.join("rents_filled.csv"),
            &[rent_estimate("09110", "Capitol Planning Region", "CT", 1_450)],
        )
        .unwrap();
        tables::write_table(
            &fill_dir.join("rents_estimates.csv"),
            &[rent_estimate("09120", "Greater Bridgeport", "CT", 1_650)],
        )
        .unwrap();

        let estimates = FillTables::load(&fill_dir).unwrap();
        assert_eq!(estimates.rents.len(), 2);
        assert_eq!(estimates.rents[0].fips, "09110");
        assert_eq!(estimates.rents[1].fips, "09120");
    }
}
