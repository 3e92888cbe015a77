//! The deviation scorer.
//!
//! Measures how far one county sits from a filter configuration. Only
//! metrics that are both enabled and narrowed below the dataset's
//! absolute bounds participate; a configuration that narrows nothing
//! produces no score at all rather than a meaningless zero.

use county_compass_county_models::{CountyRecord, Metric};
use county_compass_scoring_models::{FilterConfiguration, StatisticsSummary};

/// Ceiling for deviations inside the requested range. In-range values
/// map to `[0, 0.3]` and out-of-range values start above it, so an
/// in-range county can never score worse than an out-of-range one on
/// the same metric.
pub const IN_RANGE_CEILING: f64 = 0.3;

/// Distance of `value` from the working range `[range_min, range_max]`
/// on the scorer's unit-free deviation scale.
///
/// Inside the range the deviation is the distance from the range center,
/// scaled so the center scores 0 and the edges [`IN_RANGE_CEILING`].
/// Outside it is [`IN_RANGE_CEILING`] plus the overshoot in units of
/// `half_stdev`. A collapsed range (`range_min == range_max`) measures
/// the distance from that single point in `half_stdev` units.
///
/// When `half_stdev` is 0 (every dataset value identical) an
/// out-of-range deviation is infinite. That still ranks correctly:
/// infinity sorts last.
#[must_use]
pub fn range_deviation(value: f64, range_min: f64, range_max: f64, half_stdev: f64) -> f64 {
    let half_range = (range_max - range_min) / 2.0;
    if half_range == 0.0 {
        return (value - range_min).abs() / half_stdev;
    }
    if (range_min..=range_max).contains(&value) {
        let center = f64::midpoint(range_min, range_max);
        return (value - center).abs() / half_range * IN_RANGE_CEILING;
    }
    let overshoot = if value < range_min {
        range_min - value
    } else {
        value - range_max
    };
    IN_RANGE_CEILING + overshoot / half_stdev
}

/// Scores one county against a filter configuration.
///
/// Each participating metric contributes its [`range_deviation`]
/// weighted by importance, and the score is the weighted mean. A metric
/// participates only when it is enabled and its resolved range narrows
/// the dataset's absolute bounds; an enabled filter left at full width
/// expresses no preference.
///
/// Returns `None` (the sentinel case) when no metric participates. 0 is
/// a perfect match and anything under 0.5 is close; scores past 4 are
/// far outside every requested range.
#[must_use]
pub fn score_county(
    county: &CountyRecord,
    config: &FilterConfiguration,
    stats: &StatisticsSummary,
) -> Option<f64> {
    let mut weighted_total = 0.0;
    let mut total_importance = 0.0;
    for metric in Metric::all() {
        let filter = config.metric(*metric);
        let absolute = stats.metric(*metric);
        if !filter.enabled || !filter.narrows_range(absolute) {
            continue;
        }
        let (range_min, range_max) = filter.resolved_range(absolute);
        let deviation = range_deviation(
            county.metric_value(*metric),
            range_min,
            range_max,
            absolute.half_stdev,
        );
        let importance = f64::from(filter.importance.value());
        weighted_total += deviation * importance;
        total_importance += importance;
    }
    if total_importance == 0.0 {
        None
    } else {
        Some(weighted_total / total_importance)
    }
}
