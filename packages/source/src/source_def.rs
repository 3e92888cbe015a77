//! Config-driven data source definitions.
//!
//! Everything unique about an upstream provider lives in a TOML file
//! (see [`crate::registry`]): endpoints, years, variables, licensing.
//! [`SourceDefinition::run`] dispatches to the matching fetcher,
//! truncates for smoke runs, and writes the FIPS-sorted base table, so
//! the pipeline only ever deals in definitions.

use std::sync::Arc;

use serde::Deserialize;

use crate::progress::ProgressCallback;
use crate::{FetchOptions, SourceError, acs, elections, hud, noaa, tables};

/// A complete data source definition, loaded from embedded TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier, e.g. `"census_population"`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Organization publishing the data.
    pub provider: String,
    /// Base table filename written under the output directory.
    pub output_filename: String,
    /// Licensing and attribution metadata.
    pub license: LicenseInfo,
    /// How to fetch and normalize the raw data.
    pub fetcher: FetcherConfig,
}

/// Licensing and usage metadata for a data source.
///
/// Recorded per source so redistribution questions never require
/// re-research.
#[derive(Debug, Clone, Deserialize)]
pub struct LicenseInfo {
    /// License identifier, e.g. `"public_domain"`.
    pub license_type: String,
    /// URL of the provider's terms of service, if published.
    #[serde(default)]
    pub tos_url: Option<String>,
    /// Whether attribution is required when redistributing.
    pub attribution_required: bool,
    /// Verbatim attribution text to display when required.
    #[serde(default)]
    pub attribution_text: Option<String>,
}

/// Which base table a Census ACS variable feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcsStatistic {
    /// Total population (`B01001_001E`).
    Population,
    /// Median age (`B01002_001E`).
    MedianAge,
    /// Median home value (`B25077_001E`).
    HomeValue,
}

/// How to fetch raw data from the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Census ACS 5-year estimates API.
    CensusAcs {
        /// API root, e.g. `https://api.census.gov/data`.
        api_url: String,
        /// Vintage year.
        year: u16,
        /// ACS variable code.
        variable: String,
        /// Which base table the variable feeds.
        statistic: AcsStatistic,
    },
    /// HUD Fair Market Rent API (requires `HUD_API_KEY`).
    HudFmr {
        /// API root, e.g. `https://www.huduser.gov/hudapi/public`.
        api_url: String,
        /// FMR year.
        year: u16,
    },
    /// NOAA nClimGrid daily county archives.
    NoaaMonthly {
        /// Twelve monthly `.tar.gz` URLs, January first. Each filename
        /// ends in a publication date that cannot be derived, so the
        /// full URLs are spelled out.
        archive_urls: Vec<String>,
        /// Data year.
        year: u16,
    },
    /// Single-file county election results CSV.
    ElectionResults {
        /// CSV download URL.
        url: String,
        /// Election year.
        year: u16,
    },
}

/// Parses a TOML source definition.
///
/// # Errors
///
/// Returns the underlying TOML error when the config is malformed or
/// missing required fields.
pub fn parse_source_toml(raw: &str) -> Result<SourceDefinition, toml::de::Error> {
    toml::from_str(raw)
}

impl SourceDefinition {
    /// Fetches this source and writes its base table under
    /// `options.output_dir`. Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the fetch fails or the table cannot
    /// be written.
    pub async fn run(
        &self,
        client: &reqwest::Client,
        options: &FetchOptions,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<u64, SourceError> {
        let path = options.output_dir.join(&self.output_filename);
        log::info!("[{}] fetching {}", self.id, self.name);

        let written = match &self.fetcher {
            FetcherConfig::CensusAcs {
                api_url,
                year,
                variable,
                statistic,
            } => match statistic {
                AcsStatistic::Population => {
                    let mut rows =
                        acs::fetch_population(client, api_url, *year, variable, progress).await?;
                    rows.sort_by(|a, b| a.fips.cmp(&b.fips));
                    truncate(&mut rows, options.limit);
                    tables::write_table(&path, &rows)?;
                    rows.len()
                }
                AcsStatistic::MedianAge => {
                    let mut rows =
                        acs::fetch_median_ages(client, api_url, *year, variable, progress).await?;
                    rows.sort_by(|a, b| a.fips.cmp(&b.fips));
                    truncate(&mut rows, options.limit);
                    tables::write_table(&path, &rows)?;
                    rows.len()
                }
                AcsStatistic::HomeValue => {
                    let mut rows =
                        acs::fetch_home_values(client, api_url, *year, variable, progress).await?;
                    rows.sort_by(|a, b| a.fips.cmp(&b.fips));
                    truncate(&mut rows, options.limit);
                    tables::write_table(&path, &rows)?;
                    rows.len()
                }
            },
            FetcherConfig::HudFmr { api_url, year } => {
                let mut rows = hud::fetch_rents(client, api_url, *year, progress).await?;
                truncate(&mut rows, options.limit);
                tables::write_table(&path, &rows)?;
                rows.len()
            }
            FetcherConfig::NoaaMonthly { archive_urls, year } => {
                let mut rows =
                    noaa::fetch_temperatures(client, archive_urls, *year, progress).await?;
                truncate(&mut rows, options.limit);
                tables::write_table(&path, &rows)?;
                rows.len()
            }
            FetcherConfig::ElectionResults { url, year } => {
                let mut rows = elections::fetch_elections(client, url, *year, progress).await?;
                truncate(&mut rows, options.limit);
                tables::write_table(&path, &rows)?;
                rows.len()
            }
        };

        log::info!("[{}] wrote {written} rows to {}", self.id, path.display());
        progress.finish(format!("[{}] {written} rows", self.id));
        Ok(written as u64)
    }
}

fn truncate<T>(rows: &mut Vec<T>, limit: Option<u64>) {
    if let Some(limit) = limit {
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_definition_parses() {
        let raw = r#"
id = "census_population"
name = "Census ACS 5-Year County Population"
provider = "U.S. Census Bureau"
output_filename = "population_2023.csv"

[license]
license_type = "public_domain"
attribution_required = false

[fetcher]
type = "census_acs"
api_url = "https://api.census.gov/data"
year = 2023
variable = "B01001_001E"
statistic = "population"
"#;

        let def = parse_source_toml(raw).unwrap();

        assert_eq!(def.id, "census_population");
        assert_eq!(def.license.license_type, "public_domain");
        assert!(def.license.tos_url.is_none());
        match def.fetcher {
            FetcherConfig::CensusAcs {
                year, statistic, ..
            } => {
                assert_eq!(year, 2023);
                assert_eq!(statistic, AcsStatistic::Population);
            }
            _ => panic!("expected a census_acs fetcher"),
        }
    }

    #[test]
    fn noaa_definition_parses_archive_urls() {
        let raw = r#"
id = "noaa_temperatures"
name = "NOAA nClimGrid County Temperatures"
provider = "NOAA NCEI"
output_filename = "temperatures_2023.csv"

[license]
license_type = "public_domain"
attribution_required = false

[fetcher]
type = "noaa_monthly"
archive_urls = ["https://example.com/jan.tar.gz", "https://example.com/feb.tar.gz"]
year = 2023
"#;

        let def = parse_source_toml(raw).unwrap();
        match def.fetcher {
            FetcherConfig::NoaaMonthly { archive_urls, year } => {
                assert_eq!(archive_urls.len(), 2);
                assert_eq!(year, 2023);
            }
            _ => panic!("expected a noaa_monthly fetcher"),
        }
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(parse_source_toml("id = ").is_err());
    }
}
