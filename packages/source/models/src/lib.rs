#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row types for the base data tables.
//!
//! Every fetcher normalizes its provider's payload into one of these row
//! shapes and writes a flat CSV under `data/base/`. The combine pipeline
//! reads the same types back, so the CSV headers are pinned by the field
//! names here and nowhere else.

use county_compass_county_models::Party;
use serde::{Deserialize, Serialize};

/// One county's total population from the Census ACS 5-year estimates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name as reported, usually `"Autauga County, Alabama"`.
    pub county: String,
    /// Full state name.
    pub state: String,
    /// Total population estimate.
    pub population: u64,
    /// ACS vintage year.
    pub year: u16,
}

/// One county's median age from the Census ACS 5-year estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianAgeRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name as reported.
    pub county: String,
    /// Full state name.
    pub state: String,
    /// Median age in years.
    pub median_age: f64,
    /// ACS vintage year.
    pub year: u16,
}

/// One county's median home value from the Census ACS 5-year estimates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeValueRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name as reported.
    pub county: String,
    /// Full state name.
    pub state: String,
    /// Median value of owner-occupied housing units, in dollars.
    pub median_home_value: u64,
    /// ACS vintage year.
    pub year: u16,
}

/// One county's annual average temperature from the NOAA `nClimGrid`
/// daily county grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name in NOAA's `"AL: Autauga"` form.
    pub county: String,
    /// Two-letter state abbreviation, taken from the name prefix.
    pub state: String,
    /// Mean of the available monthly mean temperatures, in °F.
    pub avg_temp_f: f64,
    /// Number of months that had usable daily data (at most 12).
    pub months_with_data: u8,
    /// Data year.
    pub year: u16,
}

/// One county's fair market rents from the HUD FMR API.
///
/// The median rent is the two-bedroom FMR; rows without it are never
/// written. Individual unit sizes can still be absent for a few
/// non-metro entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name as reported by HUD.
    pub county: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// Two-bedroom fair market rent, in dollars per month.
    pub median_rent: u64,
    /// Efficiency (studio) FMR.
    pub efficiency: Option<u64>,
    /// One-bedroom FMR.
    pub one_bedroom: Option<u64>,
    /// Two-bedroom FMR.
    pub two_bedroom: Option<u64>,
    /// Three-bedroom FMR.
    pub three_bedroom: Option<u64>,
    /// Four-bedroom FMR.
    pub four_bedroom: Option<u64>,
    /// FMR year.
    pub year: u16,
}

/// One county's presidential election results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionRow {
    /// 5-digit county FIPS.
    pub fips: String,
    /// County name as reported.
    pub county: String,
    /// Full state name.
    pub state: String,
    /// Total votes cast, including third parties.
    pub total_votes: u64,
    /// Democratic candidate votes.
    pub democrat_votes: u64,
    /// Republican candidate votes.
    pub republican_votes: u64,
    /// Democratic share of the total, rounded to two decimals.
    pub democrat_percentage: f64,
    /// Republican share of the total, rounded to two decimals.
    pub republican_percentage: f64,
    /// Winning party; ties go to [`Party::Democrat`] (the Republican
    /// share must be strictly higher to win).
    pub winner: Party,
    /// Election year.
    pub year: u16,
}
