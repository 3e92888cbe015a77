#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Filter configuration and summary statistics types for county scoring.
//!
//! A [`FilterConfiguration`] captures one snapshot of the user's
//! preferences: which metrics are enabled, their range overrides, and how
//! much each matters. It is rebuilt per interaction and passed explicitly
//! into every scoring call; nothing here is ambient state.

use county_compass_county_models::{CountyRecord, Metric};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Per-metric weight, from 1 (barely matters) to 5 (dealbreaker).
#[derive(
    Debug,
    Default,
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
pub enum Importance {
    /// Weight 1: a mild preference
    Lowest = 1,
    /// Weight 2
    Low = 2,
    /// Weight 3: the default
    #[default]
    Medium = 3,
    /// Weight 4
    High = 4,
    /// Weight 5: dominates the combined score
    Highest = 5,
}

impl Importance {
    /// Returns the numeric weight of this importance level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates an importance level from a numeric weight.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidImportanceError> {
        match value {
            1 => Ok(Self::Lowest),
            2 => Ok(Self::Low),
            3 => Ok(Self::Medium),
            4 => Ok(Self::High),
            5 => Ok(Self::Highest),
            _ => Err(InvalidImportanceError { value }),
        }
    }

    /// Creates an importance level from a numeric weight, clamping
    /// out-of-range values to the nearest bound.
    #[must_use]
    pub const fn from_value_clamped(value: u8) -> Self {
        match value {
            0 | 1 => Self::Lowest,
            2 => Self::Low,
            3 => Self::Medium,
            4 => Self::High,
            _ => Self::Highest,
        }
    }
}

/// Error returned when attempting to create an [`Importance`] from an
/// invalid numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidImportanceError {
    /// The invalid weight that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidImportanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid importance value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidImportanceError {}

/// Summary statistics for a single metric across the whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricStats {
    /// Smallest value in the dataset.
    pub min: f64,
    /// Largest value in the dataset.
    pub max: f64,
    /// Population standard deviation divided by 2. Not a statistical
    /// correction: halving widens the scorer's close-match tolerance
    /// band.
    pub half_stdev: f64,
    /// 8 interior thresholds splitting the sorted values into 9
    /// equal-count buckets. Non-decreasing, within [min, max].
    pub quantile_thresholds: [f64; 8],
}

/// Per-dataset summary statistics for all five metrics.
///
/// Computed once per dataset load and shared read-only with every
/// scoring call; never recomputed on filter interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsSummary {
    /// Population stats.
    pub population: MetricStats,
    /// Median age stats.
    pub median_age: MetricStats,
    /// Temperature stats.
    pub temperature: MetricStats,
    /// Home value stats.
    pub home_value: MetricStats,
    /// Median rent stats.
    pub median_rent: MetricStats,
}

impl StatisticsSummary {
    /// Returns the stats for one metric.
    #[must_use]
    pub const fn metric(&self, metric: Metric) -> &MetricStats {
        match metric {
            Metric::Population => &self.population,
            Metric::MedianAge => &self.median_age,
            Metric::Temperature => &self.temperature,
            Metric::HomeValue => &self.home_value,
            Metric::MedianRent => &self.median_rent,
        }
    }
}

/// One metric's filter state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricFilter {
    /// Whether this metric participates in scoring at all.
    pub enabled: bool,
    /// Lower bound override; falls back to the dataset minimum when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound override; falls back to the dataset maximum when
    /// unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Weight of this metric in the combined score.
    pub importance: Importance,
}

impl MetricFilter {
    /// Resolves the effective working range against the dataset's
    /// absolute bounds: each unset override falls back to the absolute
    /// bound.
    ///
    /// No clamping happens here. An override outside the absolute bounds
    /// passes through unchanged; keeping slider input sane is the UI
    /// layer's job.
    #[must_use]
    pub fn resolved_range(&self, absolute: &MetricStats) -> (f64, f64) {
        (
            self.min.unwrap_or(absolute.min),
            self.max.unwrap_or(absolute.max),
        )
    }

    /// Whether the resolved range actually narrows the absolute bounds.
    ///
    /// A filter whose resolved range equals the absolute [min, max]
    /// exactly expresses no preference: the scorer skips it even when
    /// `enabled` is true. An override explicitly set to the absolute
    /// bound is indistinguishable from an untouched one.
    #[must_use]
    pub fn narrows_range(&self, absolute: &MetricStats) -> bool {
        let (min, max) = self.resolved_range(absolute);
        min != absolute.min || max != absolute.max
    }
}

impl Default for MetricFilter {
    fn default() -> Self {
        Self {
            enabled: true,
            min: None,
            max: None,
            importance: Importance::Medium,
        }
    }
}

/// One snapshot of the user's filter preferences across all five
/// metrics.
///
/// The default configuration enables every metric at medium importance
/// with no range overrides, which scores every county as the sentinel
/// until a range is narrowed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfiguration {
    /// Population filter.
    pub population: MetricFilter,
    /// Median age filter.
    pub median_age: MetricFilter,
    /// Temperature filter.
    pub temperature: MetricFilter,
    /// Home value filter.
    pub home_value: MetricFilter,
    /// Median rent filter.
    pub median_rent: MetricFilter,
}

impl FilterConfiguration {
    /// Returns the filter for one metric.
    #[must_use]
    pub const fn metric(&self, metric: Metric) -> &MetricFilter {
        match metric {
            Metric::Population => &self.population,
            Metric::MedianAge => &self.median_age,
            Metric::Temperature => &self.temperature,
            Metric::HomeValue => &self.home_value,
            Metric::MedianRent => &self.median_rent,
        }
    }

    /// Returns a mutable reference to the filter for one metric.
    pub const fn metric_mut(&mut self, metric: Metric) -> &mut MetricFilter {
        match metric {
            Metric::Population => &mut self.population,
            Metric::MedianAge => &mut self.median_age,
            Metric::Temperature => &mut self.temperature,
            Metric::HomeValue => &mut self.home_value,
            Metric::MedianRent => &mut self.median_rent,
        }
    }
}

/// One entry of the ranked top-matches list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatch {
    /// The matched county.
    pub county: CountyRecord,
    /// Its deviation score; never the sentinel (sentinel entries are
    /// dropped before ranking).
    pub score: f64,
}

impl RankedMatch {
    /// Display-friendly match strength: 100% at score 0, falling
    /// linearly to 0% at score 4 and floored there.
    #[must_use]
    pub fn match_percent(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = ((1.0 - self.score / 4.0) * 100.0).round().clamp(0.0, 100.0) as u8;
        pct
    }
}
