#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! County record types and metric definitions.
//!
//! This crate defines the canonical per-county record shape shared across
//! the entire system: the combine pipeline produces it, the dataset loader
//! validates it, the scoring engine and API server consume it. Each metric
//! group that can be backfilled from hand-curated estimates carries its own
//! `is_estimated` provenance flag.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The five scoreable county metrics.
///
/// String forms are stable snake_case identifiers used in URLs, CLI
/// arguments, and serialized filter configurations.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Total population (ACS 5-year estimate)
    Population,
    /// Median age in years
    MedianAge,
    /// Average annual temperature in °F
    Temperature,
    /// Median home value in dollars
    HomeValue,
    /// Median 2-bedroom fair-market rent in dollars
    MedianRent,
}

impl Metric {
    /// Returns all metrics in canonical display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Population,
            Self::MedianAge,
            Self::Temperature,
            Self::HomeValue,
            Self::MedianRent,
        ]
    }

    /// Human-readable label for UI display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Population => "Population",
            Self::MedianAge => "Median Age",
            Self::Temperature => "Avg Temperature",
            Self::HomeValue => "Median Home Value",
            Self::MedianRent => "Median Rent",
        }
    }

    /// Unit suffix for formatted values, empty when the value is a bare
    /// count.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Population => "",
            Self::MedianAge => " yrs",
            Self::Temperature => " °F",
            Self::HomeValue | Self::MedianRent => " USD",
        }
    }
}

/// Winning party of a county's presidential vote.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Party {
    /// Democratic candidate carried the county
    Democrat,
    /// Republican candidate carried the county
    Republican,
}

/// Average annual temperature for a county.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temperature {
    /// Mean of available monthly average temperatures, °F.
    pub avg_temp_f: f64,
    /// Whether the value came from a hand-curated estimate rather than
    /// the NOAA grid.
    pub is_estimated: bool,
}

/// Raw vote counts for a county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTotals {
    /// Votes for the Democratic candidate.
    pub democrat: u64,
    /// Votes for the Republican candidate.
    pub republican: u64,
    /// All votes cast, including third-party.
    pub total: u64,
}

/// Vote shares for a county, in percent with two-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotePercentages {
    /// Democratic share of the total vote.
    pub democrat: f64,
    /// Republican share of the total vote.
    pub republican: f64,
}

/// Presidential election results for a county.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Votes {
    /// Raw counts.
    pub totals: VoteTotals,
    /// Derived percentages.
    pub percentages: VotePercentages,
    /// Party with the larger vote share.
    pub winner: Party,
    /// Whether the results came from a hand-curated estimate.
    pub is_estimated: bool,
}

/// Housing market figures for a county.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Housing {
    /// Median home value in dollars (ACS 5-year estimate).
    pub median_home_value: u64,
    /// Median home value as a percentage of the national median, when
    /// known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_national_median: Option<f64>,
    /// Whether the value came from a hand-curated estimate.
    pub is_estimated: bool,
}

/// Fair-market rent broken down by unit size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentSizes {
    /// Efficiency / studio.
    pub efficiency: u64,
    /// One bedroom.
    pub one_bedroom: u64,
    /// Two bedrooms.
    pub two_bedroom: u64,
    /// Three bedrooms.
    pub three_bedroom: u64,
    /// Four bedrooms.
    pub four_bedroom: u64,
}

/// Rent figures for a county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rent {
    /// Median rent in dollars; by convention the 2-bedroom fair-market
    /// rent.
    pub median_rent: u64,
    /// Per-unit-size breakdown.
    pub sizes: RentSizes,
    /// Whether the values came from a hand-curated estimate.
    pub is_estimated: bool,
}

/// One county's full record. ~3,143 instances in a complete dataset.
///
/// Immutable once loaded: the scoring engine and server share records by
/// read-only reference and never mutate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyRecord {
    /// Zero-padded 5-digit county FIPS code (state FIPS + county FIPS).
    pub fips: String,
    /// Display name as published by the Census, e.g. "Autauga County".
    pub name: String,
    /// Full state name, e.g. "Alabama".
    pub state: String,
    /// Total population.
    pub population: u64,
    /// Median age in years.
    pub median_age: f64,
    /// Temperature group.
    pub temperature: Temperature,
    /// Election results group.
    pub votes: Votes,
    /// Housing group.
    pub housing: Housing,
    /// Rent group.
    pub rent: Rent,
}

impl CountyRecord {
    /// Returns the numeric value backing a metric for this county.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn metric_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Population => self.population as f64,
            Metric::MedianAge => self.median_age,
            Metric::Temperature => self.temperature.avg_temp_f,
            Metric::HomeValue => self.housing.median_home_value as f64,
            Metric::MedianRent => self.rent.median_rent as f64,
        }
    }

    /// Whether any metric group carries estimated (non-source) data.
    #[must_use]
    pub const fn has_estimates(&self) -> bool {
        self.temperature.is_estimated
            || self.votes.is_estimated
            || self.housing.is_estimated
            || self.rent.is_estimated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_county() -> CountyRecord {
        CountyRecord {
            fips: "01001".to_string(),
            name: "Autauga County".to_string(),
            state: "Alabama".to_string(),
            population: 59_285,
            median_age: 38.6,
            temperature: Temperature {
                avg_temp_f: 64.4,
                is_estimated: false,
            },
            votes: Votes {
                totals: VoteTotals {
                    democrat: 7_503,
                    republican: 19_838,
                    total: 27_770,
                },
                percentages: VotePercentages {
                    democrat: 27.02,
                    republican: 71.44,
                },
                winner: Party::Republican,
                is_estimated: false,
            },
            housing: Housing {
                median_home_value: 203_300,
                percent_national_median: None,
                is_estimated: false,
            },
            rent: Rent {
                median_rent: 1_171,
                sizes: RentSizes {
                    efficiency: 870,
                    one_bedroom: 875,
                    two_bedroom: 1_171,
                    three_bedroom: 1_549,
                    four_bedroom: 1_924,
                },
                is_estimated: true,
            },
        }
    }

    #[test]
    fn metric_string_roundtrip() {
        for metric in Metric::all() {
            let s = metric.to_string();
            let parsed: Metric = s.parse().unwrap();
            assert_eq!(parsed, *metric, "roundtrip failed for {s}");
        }
        assert_eq!(Metric::MedianAge.to_string(), "median_age");
        assert!("not_a_metric".parse::<Metric>().is_err());
    }

    #[test]
    fn metric_value_accessor() {
        let county = sample_county();
        assert!((county.metric_value(Metric::Population) - 59_285.0).abs() < f64::EPSILON);
        assert!((county.metric_value(Metric::MedianAge) - 38.6).abs() < f64::EPSILON);
        assert!((county.metric_value(Metric::Temperature) - 64.4).abs() < f64::EPSILON);
        assert!((county.metric_value(Metric::HomeValue) - 203_300.0).abs() < f64::EPSILON);
        assert!((county.metric_value(Metric::MedianRent) - 1_171.0).abs() < f64::EPSILON);
    }

    #[test]
    fn estimate_detection() {
        let mut county = sample_county();
        assert!(county.has_estimates());
        county.rent.is_estimated = false;
        assert!(!county.has_estimates());
    }

    #[test]
    fn party_string_forms() {
        assert_eq!(Party::Democrat.to_string(), "democrat");
        assert_eq!("republican".parse::<Party>().unwrap(), Party::Republican);
    }
}
