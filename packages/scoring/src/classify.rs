//! Bucket classification and color palettes.
//!
//! Two classification schemes feed the choropleth layers: combined
//! scores fall into nine fixed-width buckets on the deviation scale,
//! while single-metric layers bucket each value by the dataset's
//! quantile thresholds so every color band holds roughly the same
//! number of counties.

use county_compass_county_models::Metric;
use county_compass_scoring_models::StatisticsSummary;

/// Combined-score palette, bucket 1 (best) through 9 (worst): deep navy
/// through teal into white.
pub const COMBINED_PALETTE: [&str; 9] = [
    "#173B53", "#205274", "#3280B5", "#49B7C2", "#85CCBB", "#CAE9B5", "#FEFFCF", "#FEFFE0",
    "#ffffff",
];

/// Neutral fill for counties the current configuration leaves unscored.
pub const UNFILTERED_COLOR: &str = "#e5e7eb";

const POPULATION_PALETTE: [&str; 9] = [
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
    "#800026",
];

const MEDIAN_AGE_PALETTE: [&str; 9] = [
    "#f7fcfd", "#e0ecf4", "#bfd3e6", "#9ebcda", "#8c96c6", "#8c6bb1", "#88419d", "#810f7c",
    "#4d004b",
];

const TEMPERATURE_PALETTE: [&str; 9] = [
    "#2166ac", "#4393c3", "#74add1", "#abd9e9", "#ffffbf", "#fee090", "#fdae61", "#f46d43",
    "#d73027",
];

const HOME_VALUE_PALETTE: [&str; 9] = [
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
    "#00441b",
];

const MEDIAN_RENT_PALETTE: [&str; 9] = [
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c", "#f16913", "#d94801", "#a63603",
    "#7f2704",
];

/// Nine-step low-to-high palette for one single-metric layer.
#[must_use]
pub const fn metric_palette(metric: Metric) -> &'static [&'static str; 9] {
    match metric {
        Metric::Population => &POPULATION_PALETTE,
        Metric::MedianAge => &MEDIAN_AGE_PALETTE,
        Metric::Temperature => &TEMPERATURE_PALETTE,
        Metric::HomeValue => &HOME_VALUE_PALETTE,
        Metric::MedianRent => &MEDIAN_RENT_PALETTE,
    }
}

/// Maps a combined score onto buckets 1 (best) through 9 (worst) in
/// fixed 0.5-wide steps; everything past 4.0 lands in bucket 9.
#[must_use]
pub const fn score_bucket(score: f64) -> u8 {
    if score <= 0.5 {
        1
    } else if score <= 1.0 {
        2
    } else if score <= 1.5 {
        3
    } else if score <= 2.0 {
        4
    } else if score <= 2.5 {
        5
    } else if score <= 3.0 {
        6
    } else if score <= 3.5 {
        7
    } else if score <= 4.0 {
        8
    } else {
        9
    }
}

/// Counts how many quantile thresholds the value strictly exceeds,
/// yielding bucket 0 (lowest ninth of the dataset) through 8 (highest).
/// A value equal to a threshold stays in the lower bucket.
#[must_use]
pub fn quantile_bucket(value: f64, thresholds: &[f64; 8]) -> usize {
    thresholds
        .iter()
        .filter(|threshold| value > **threshold)
        .count()
}

/// Fill color for a combined score; unscored counties get the neutral
/// [`UNFILTERED_COLOR`].
#[must_use]
pub fn score_color(score: Option<f64>) -> &'static str {
    match score {
        Some(score) => COMBINED_PALETTE[usize::from(score_bucket(score) - 1)],
        None => UNFILTERED_COLOR,
    }
}

/// Fill color for one county value on a single-metric layer.
#[must_use]
pub fn metric_color(value: f64, metric: Metric, stats: &StatisticsSummary) -> &'static str {
    let thresholds = &stats.metric(metric).quantile_thresholds;
    metric_palette(metric)[quantile_bucket(value, thresholds)]
}
