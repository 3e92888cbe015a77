//! Source registry, loading all definitions from embedded TOML.
//!
//! Each `.toml` under `packages/source/sources/` is baked in at compile
//! time. Adding a source means adding a TOML file and one entry to
//! [`SOURCE_TOMLS`].

use crate::source_def::{SourceDefinition, parse_source_toml};

/// TOML configs embedded at compile time, name first for error
/// messages.
const SOURCE_TOMLS: &[(&str, &str)] = &[
    (
        "census_population",
        include_str!("../sources/census_population.toml"),
    ),
    (
        "census_median_age",
        include_str!("../sources/census_median_age.toml"),
    ),
    (
        "census_home_value",
        include_str!("../sources/census_home_value.toml"),
    ),
    ("hud_rents", include_str!("../sources/hud_rents.toml")),
    (
        "noaa_temperatures",
        include_str!("../sources/noaa_temperatures.toml"),
    ),
    (
        "county_elections",
        include_str!("../sources/county_elections.toml"),
    ),
];

/// Returns every configured source definition.
///
/// # Panics
///
/// Panics when an embedded TOML fails to parse, which is a build
/// mistake rather than a runtime condition.
#[must_use]
pub fn all_sources() -> Vec<SourceDefinition> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, raw)| {
            parse_source_toml(raw).unwrap_or_else(|e| panic!("failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns one source by id.
#[must_use]
pub fn source_by_id(id: &str) -> Option<SourceDefinition> {
    all_sources().into_iter().find(|source| source.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::source_def::{AcsStatistic, FetcherConfig};

    use super::*;

    const EXPECTED_SOURCE_COUNT: usize = 6;

    #[test]
    fn all_embedded_configs_parse() {
        let sources = all_sources();
        assert_eq!(sources.len(), EXPECTED_SOURCE_COUNT);
    }

    #[test]
    fn ids_match_their_filenames_and_are_unique() {
        let sources = all_sources();
        let mut seen = HashSet::new();
        for (source, (name, _)) in sources.iter().zip(SOURCE_TOMLS) {
            assert_eq!(&source.id, name);
            assert!(seen.insert(source.id.clone()), "duplicate id {}", source.id);
        }
    }

    #[test]
    fn output_filenames_are_unique_csvs() {
        let sources = all_sources();
        let mut seen = HashSet::new();
        for source in &sources {
            assert!(
                source.output_filename.ends_with(".csv"),
                "{} output is not a CSV",
                source.id
            );
            assert!(seen.insert(source.output_filename.clone()));
        }
    }

    #[test]
    fn census_variables_match_their_statistics() {
        for source in all_sources() {
            if let FetcherConfig::CensusAcs {
                variable,
                statistic,
                ..
            } = &source.fetcher
            {
                let expected = match statistic {
                    AcsStatistic::Population => "B01001_001E",
                    AcsStatistic::MedianAge => "B01002_001E",
                    AcsStatistic::HomeValue => "B25077_001E",
                };
                assert_eq!(variable, expected, "{} variable mismatch", source.id);
            }
        }
    }

    #[test]
    fn noaa_config_covers_twelve_months() {
        let source = source_by_id("noaa_temperatures").unwrap();
        let FetcherConfig::NoaaMonthly { archive_urls, .. } = &source.fetcher else {
            panic!("noaa_temperatures should use the noaa_monthly fetcher");
        };
        assert_eq!(archive_urls.len(), 12);
        for url in archive_urls {
            assert!(url.ends_with(".tar.gz"));
        }
    }

    #[test]
    fn unknown_id_returns_none() {
        assert!(source_by_id("not_a_source").is_none());
    }
}
