//! Top-matches ranking.

use county_compass_county_models::CountyRecord;
use county_compass_scoring_models::{FilterConfiguration, RankedMatch, StatisticsSummary};

use crate::score::score_county;

/// Number of ranked matches returned to callers that do not ask for a
/// specific count.
pub const DEFAULT_LIMIT: usize = 10;

/// Scores every county, ranks the scored ones ascending, and returns the
/// closest `limit` matches.
///
/// Unscored counties are dropped before ranking, so an all-default
/// configuration yields an empty list rather than an arbitrary one. The
/// sort is stable: counties with equal scores keep their dataset order.
#[must_use]
pub fn top_matches(
    counties: &[CountyRecord],
    config: &FilterConfiguration,
    stats: &StatisticsSummary,
    limit: usize,
) -> Vec<RankedMatch> {
    let mut scored: Vec<(usize, f64)> = counties
        .iter()
        .enumerate()
        .filter_map(|(index, county)| {
            score_county(county, config, stats).map(|score| (index, score))
        })
        .collect();
    scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
        .into_iter()
        .map(|(index, score)| RankedMatch {
            county: counties[index].clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;
    use crate::test_support::{county, population_dataset};
    use county_compass_county_models::Metric;
    use county_compass_scoring_models::MetricFilter;

    fn narrowed_population(min: f64, max: f64) -> FilterConfiguration {
        let mut config = FilterConfiguration::default();
        for metric in Metric::all() {
            config.metric_mut(*metric).enabled = false;
        }
        config.population = MetricFilter {
            enabled: true,
            min: Some(min),
            max: Some(max),
            ..Default::default()
        };
        config
    }

    #[test]
    fn ranks_ascending_and_truncates() {
        let counties = population_dataset(&[1_000, 48_000, 55_000, 90_000, 200_000]);
        let stats = summarize(&counties);
        let config = narrowed_population(10_000.0, 90_000.0);
        let matches = top_matches(&counties, &config, &stats, 3);
        assert_eq!(matches.len(), 3);
        for pair in matches.windows(2) {
            assert!(pair[0].score <= pair[1].score);
        }
        // 48k sits closest to the 50k range center.
        assert_eq!(matches[0].county.population, 48_000);
    }

    #[test]
    fn unscored_counties_are_dropped() {
        let counties = population_dataset(&[1_000, 2_000, 3_000]);
        let stats = summarize(&counties);
        let config = FilterConfiguration::default();
        assert!(top_matches(&counties, &config, &stats, DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn tied_scores_keep_dataset_order() {
        let mut counties = vec![
            county("10001", 5_000, 38.0, 60.0, 150_000, 900),
            county("20002", 5_000, 38.0, 60.0, 150_000, 900),
        ];
        counties.extend(population_dataset(&[1_000, 9_000]));
        let stats = summarize(&counties);
        let config = narrowed_population(4_000.0, 6_000.0);
        let matches = top_matches(&counties, &config, &stats, DEFAULT_LIMIT);
        assert_eq!(matches[0].county.fips, "10001");
        assert_eq!(matches[1].county.fips, "20002");
    }

    #[test]
    fn limit_past_the_match_count_returns_everything() {
        let counties = population_dataset(&[1_000, 5_000, 9_000]);
        let stats = summarize(&counties);
        let config = narrowed_population(4_000.0, 6_000.0);
        let matches = top_matches(&counties, &config, &stats, 50);
        assert_eq!(matches.len(), 3);
    }
}
