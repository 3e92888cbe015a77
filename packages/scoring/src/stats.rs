//! Dataset-wide summary statistics.
//!
//! [`summarize`] folds the loaded counties into a [`StatisticsSummary`]:
//! per-metric extrema, half the population standard deviation, and eight
//! interpolated quantile thresholds. The summary is computed once per
//! dataset load and shared read-only by the scorer and the classifiers.

use county_compass_county_models::{CountyRecord, Metric};
use county_compass_scoring_models::{MetricStats, StatisticsSummary};

/// Number of equal-count buckets the quantile thresholds carve each
/// metric's value range into.
pub const BUCKET_COUNT: usize = 9;

/// Computes per-metric summary statistics across the whole dataset.
///
/// Extrema fold from `+∞`/`-∞`, so an empty slice yields an inverted
/// `[+∞, -∞]` range and `NaN` spread statistics rather than panicking.
/// Callers are expected to summarize only loaded, non-empty datasets.
#[must_use]
pub fn summarize(counties: &[CountyRecord]) -> StatisticsSummary {
    StatisticsSummary {
        population: metric_stats(counties, Metric::Population),
        median_age: metric_stats(counties, Metric::MedianAge),
        temperature: metric_stats(counties, Metric::Temperature),
        home_value: metric_stats(counties, Metric::HomeValue),
        median_rent: metric_stats(counties, Metric::MedianRent),
    }
}

/// Median of `values`, averaging the middle two when the count is even.
///
/// Returns `NaN` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

fn metric_stats(counties: &[CountyRecord], metric: Metric) -> MetricStats {
    let mut values: Vec<f64> = counties
        .iter()
        .map(|county| county.metric_value(metric))
        .collect();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Half the population stdev: the scorer's tolerance band, not a
    // sample-variance correction.
    let half_stdev = population_stdev(&values) / 2.0;
    values.sort_by(f64::total_cmp);
    MetricStats {
        min,
        max,
        half_stdev,
        quantile_thresholds: quantile_thresholds(&values),
    }
}

#[allow(clippy::cast_precision_loss)]
fn population_stdev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Eight interior thresholds over ascending `sorted` values. Threshold
/// `i` (1-based) sits at fractional rank `i/9 * (n-1)`, linearly
/// interpolated between the two neighboring order statistics.
fn quantile_thresholds(sorted: &[f64]) -> [f64; 8] {
    let mut thresholds = [f64::NAN; 8];
    if sorted.is_empty() {
        return thresholds;
    }
    #[allow(clippy::cast_precision_loss)]
    let top_rank = (sorted.len() - 1) as f64;
    for (i, threshold) in thresholds.iter_mut().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let rank = (i + 1) as f64 / BUCKET_COUNT as f64 * top_rank;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let lower = rank.floor() as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let upper = rank.ceil() as usize;
        let fraction = rank - rank.floor();
        *threshold = sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction;
    }
    thresholds
}
