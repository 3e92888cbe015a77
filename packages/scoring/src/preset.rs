//! Filter presets.
//!
//! Two flavors: [`median_preset`] derives a configuration from the
//! loaded dataset so that it always produces meaningful scores, and
//! [`CuratedPreset`] carries four hand-tuned lifestyle configurations
//! with fixed absolute ranges.

use county_compass_county_models::{CountyRecord, Metric};
use county_compass_scoring_models::{
    FilterConfiguration, Importance, MetricFilter, StatisticsSummary,
};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::stats::median;

/// Builds a data-driven configuration centered on each metric's median.
///
/// Every metric is enabled at default importance with the range
/// `[median - half_stdev, median + half_stdev]`, clamped to the
/// dataset's absolute bounds. On any dataset with spread every range
/// narrows, so the preset immediately scores every county.
#[must_use]
pub fn median_preset(counties: &[CountyRecord], stats: &StatisticsSummary) -> FilterConfiguration {
    let mut config = FilterConfiguration::default();
    for metric in Metric::all() {
        let values: Vec<f64> = counties
            .iter()
            .map(|county| county.metric_value(*metric))
            .collect();
        let center = median(&values);
        let absolute = stats.metric(*metric);
        let filter = config.metric_mut(*metric);
        filter.min = Some((center - absolute.half_stdev).max(absolute.min));
        filter.max = Some((center + absolute.half_stdev).min(absolute.max));
    }
    config
}

/// The four hand-tuned lifestyle presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CuratedPreset {
    /// Warm climate, low costs, smaller towns.
    RetirementParadise,
    /// Mid-size counties with affordable family housing.
    FamilyFriendly,
    /// Large metros skewing young.
    YoungProfessional,
    /// Very small towns, minimal costs.
    RuralEscape,
}

impl CuratedPreset {
    /// Every curated preset, in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::RetirementParadise,
            Self::FamilyFriendly,
            Self::YoungProfessional,
            Self::RuralEscape,
        ]
    }

    /// Short human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RetirementParadise => "Retirement Paradise",
            Self::FamilyFriendly => "Family Friendly",
            Self::YoungProfessional => "Young Professional",
            Self::RuralEscape => "Rural Escape",
        }
    }

    /// One-line pitch shown alongside the label.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::RetirementParadise => "Warm, affordable, peaceful",
            Self::FamilyFriendly => "Affordable, mid-size, moderate climate",
            Self::YoungProfessional => "Urban, vibrant, career-oriented",
            Self::RuralEscape => "Small town, low cost, nature",
        }
    }

    /// The canned filter configuration this preset applies.
    ///
    /// Metrics without a range override stay enabled but express no
    /// preference, so they sit out of scoring while remaining visible
    /// in the filter panel.
    #[must_use]
    pub const fn configuration(self) -> FilterConfiguration {
        match self {
            Self::RetirementParadise => FilterConfiguration {
                population: filter(Importance::Low, Some(5_000.0), Some(200_000.0)),
                median_age: filter(Importance::Low, None, None),
                temperature: filter(Importance::Highest, Some(58.0), Some(75.0)),
                home_value: filter(Importance::High, Some(45_200.0), Some(250_000.0)),
                median_rent: filter(Importance::High, Some(400.0), Some(900.0)),
            },
            Self::FamilyFriendly => FilterConfiguration {
                population: filter(Importance::Medium, Some(20_000.0), Some(500_000.0)),
                median_age: filter(Importance::Medium, Some(30.0), Some(42.0)),
                temperature: filter(Importance::Low, None, None),
                home_value: filter(Importance::Highest, Some(100_000.0), Some(350_000.0)),
                median_rent: filter(Importance::Highest, Some(500.0), Some(1_200.0)),
            },
            Self::YoungProfessional => FilterConfiguration {
                // Upper bound pins the largest county in the dataset.
                population: filter(Importance::Highest, Some(100_000.0), Some(9_848_406.0)),
                median_age: filter(Importance::High, Some(25.0), Some(38.0)),
                temperature: filter(Importance::Lowest, None, None),
                home_value: filter(Importance::Low, None, None),
                median_rent: filter(Importance::Medium, None, None),
            },
            Self::RuralEscape => FilterConfiguration {
                population: filter(Importance::Highest, Some(43.0), Some(15_000.0)),
                median_age: filter(Importance::Lowest, None, None),
                temperature: filter(Importance::Lowest, None, None),
                home_value: filter(Importance::High, Some(45_200.0), Some(200_000.0)),
                median_rent: filter(Importance::High, Some(400.0), Some(800.0)),
            },
        }
    }
}

const fn filter(importance: Importance, min: Option<f64>, max: Option<f64>) -> MetricFilter {
    MetricFilter {
        enabled: true,
        min,
        max,
        importance,
    }
}
