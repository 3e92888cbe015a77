//! Derived composite indicators.

use county_compass_county_models::{CountyRecord, Metric};
use county_compass_scoring_models::StatisticsSummary;

/// Relative cost-of-living index on a 0-100 scale.
///
/// Blends the county's min-max percentile of median rent (60%) and of
/// median home value (40%) across the dataset, rounded to the nearest
/// integer. Falls back to the midpoint 50 when either metric has zero
/// spread, which only happens on degenerate datasets.
#[must_use]
pub fn cost_of_living(county: &CountyRecord, stats: &StatisticsSummary) -> u8 {
    let rent = &stats.median_rent;
    let home = &stats.home_value;
    let rent_spread = rent.max - rent.min;
    let home_spread = home.max - home.min;
    if rent_spread == 0.0 || home_spread == 0.0 {
        return 50;
    }
    let rent_pct = (county.metric_value(Metric::MedianRent) - rent.min) / rent_spread * 100.0;
    let home_pct = (county.metric_value(Metric::HomeValue) - home.min) / home_spread * 100.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = (rent_pct * 0.6 + home_pct * 0.4).round().clamp(0.0, 100.0) as u8;
    index
}
