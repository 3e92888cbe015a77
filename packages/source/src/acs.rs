//! Census ACS 5-year estimate fetchers.
//!
//! The ACS API answers with a JSON array of arrays: the first row is a
//! header and every following row is `[NAME, value, state, county]`
//! where `state` and `county` are FIPS fragments. Missing estimates
//! arrive as `null` or the `-666666666` annotation marker; both are
//! skipped, as are negative values. One variable feeds one base table,
//! so the three public fetchers here differ only in the row type they
//! produce.

use std::collections::BTreeMap;
use std::sync::Arc;

use county_compass_source_models::{HomeValueRow, MedianAgeRow, PopulationRow};
use serde_json::Value;

use crate::SourceError;
use crate::progress::ProgressCallback;
use crate::retry;

/// One parsed county observation.
struct AcsValue {
    name: String,
    value: f64,
    state_fips: String,
    county_fips: String,
}

/// Fetches the total population (`B01001_001E` by convention) for every
/// county.
///
/// # Errors
///
/// Returns [`SourceError`] when either API request fails or the payload
/// is not the expected array-of-arrays shape.
pub async fn fetch_population(
    client: &reqwest::Client,
    api_url: &str,
    year: u16,
    variable: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<PopulationRow>, SourceError> {
    let (values, states) = fetch_counties(client, api_url, year, variable, progress).await?;
    Ok(values
        .into_iter()
        .map(|v| PopulationRow {
            fips: format!("{}{}", v.state_fips, v.county_fips),
            county: v.name,
            state: states.get(&v.state_fips).cloned().unwrap_or_default(),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            population: v.value as u64,
            year,
        })
        .collect())
}

/// Fetches the median age (`B01002_001E` by convention) for every
/// county.
///
/// # Errors
///
/// Returns [`SourceError`] when either API request fails or the payload
/// is not the expected array-of-arrays shape.
pub async fn fetch_median_ages(
    client: &reqwest::Client,
    api_url: &str,
    year: u16,
    variable: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<MedianAgeRow>, SourceError> {
    let (values, states) = fetch_counties(client, api_url, year, variable, progress).await?;
    Ok(values
        .into_iter()
        .map(|v| MedianAgeRow {
            fips: format!("{}{}", v.state_fips, v.county_fips),
            county: v.name,
            state: states.get(&v.state_fips).cloned().unwrap_or_default(),
            median_age: v.value,
            year,
        })
        .collect())
}

/// Fetches the median home value (`B25077_001E` by convention) for
/// every county.
///
/// # Errors
///
/// Returns [`SourceError`] when either API request fails or the payload
/// is not the expected array-of-arrays shape.
pub async fn fetch_home_values(
    client: &reqwest::Client,
    api_url: &str,
    year: u16,
    variable: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<HomeValueRow>, SourceError> {
    let (values, states) = fetch_counties(client, api_url, year, variable, progress).await?;
    Ok(values
        .into_iter()
        .map(|v| HomeValueRow {
            fips: format!("{}{}", v.state_fips, v.county_fips),
            county: v.name,
            state: states.get(&v.state_fips).cloned().unwrap_or_default(),
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            median_home_value: v.value as u64,
            year,
        })
        .collect())
}

/// Requests one variable for all counties plus the state-name lookup
/// table.
async fn fetch_counties(
    client: &reqwest::Client,
    api_url: &str,
    year: u16,
    variable: &str,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(Vec<AcsValue>, BTreeMap<String, String>), SourceError> {
    let url = format!("{api_url}/{year}/acs/acs5");

    progress.set_message("state names".to_string());
    let body = retry::send_json(|| client.get(&url).query(&[("get", "NAME"), ("for", "state:*")]))
        .await?;
    let states = parse_state_rows(&body, &url)?;

    progress.set_message(format!("counties ({variable})"));
    let get = format!("NAME,{variable}");
    let body = retry::send_json(|| {
        client
            .get(&url)
            .query(&[("get", get.as_str()), ("for", "county:*")])
    })
    .await?;
    let values = parse_county_rows(&body, &url)?;
    progress.inc(values.len() as u64);

    Ok((values, states))
}

/// Parses the county response: rows of `[NAME, value, state, county]`
/// after a header row. Rows with missing or unusable values are
/// dropped.
fn parse_county_rows(body: &Value, url: &str) -> Result<Vec<AcsValue>, SourceError> {
    let rows = body
        .as_array()
        .ok_or_else(|| SourceError::UnexpectedPayload {
            message: format!("expected a JSON array from {url}"),
        })?;

    let mut values = Vec::new();
    for row in rows.iter().skip(1) {
        let Some(fields) = row.as_array() else {
            continue;
        };
        let [name, value, state, county] = fields.as_slice() else {
            continue;
        };
        let (Some(name), Some(state), Some(county)) = (name.as_str(), state.as_str(), county.as_str())
        else {
            continue;
        };
        let Some(value) = numeric(value) else {
            continue;
        };
        values.push(AcsValue {
            name: name.to_string(),
            value,
            state_fips: state.to_string(),
            county_fips: county.to_string(),
        });
    }
    Ok(values)
}

/// Parses the state response: rows of `[NAME, state]` after a header
/// row, into a FIPS-to-name map.
fn parse_state_rows(body: &Value, url: &str) -> Result<BTreeMap<String, String>, SourceError> {
    let rows = body
        .as_array()
        .ok_or_else(|| SourceError::UnexpectedPayload {
            message: format!("expected a JSON array from {url}"),
        })?;

    let mut states = BTreeMap::new();
    for row in rows.iter().skip(1) {
        let Some(fields) = row.as_array() else {
            continue;
        };
        let [name, fips] = fields.as_slice() else {
            continue;
        };
        if let (Some(name), Some(fips)) = (name.as_str(), fips.as_str()) {
            states.insert(fips.to_string(), name.to_string());
        }
    }
    Ok(states)
}

/// Extracts a usable estimate from an ACS cell.
///
/// The API serializes values as strings more often than numbers, so
/// both are accepted. `null` and negative values mean "no data"; the
/// `-666666666` annotation marker falls under the negative rule.
fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if parsed < 0.0 {
        return None;
    }
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn county_rows_skip_header_and_unusable_values() {
        let body = json!([
            ["NAME", "B01001_001E", "state", "county"],
            ["Autauga County, Alabama", "59285", "01", "001"],
            ["Baldwin County, Alabama", null, "01", "003"],
            ["Barbour County, Alabama", "-666666666", "01", "005"],
            ["Bibb County, Alabama", "not a number", "01", "007"],
            ["Blount County, Alabama", 59134, "01", "009"],
        ]);

        let values = parse_county_rows(&body, "test").unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values[0].name, "Autauga County, Alabama");
        assert!((values[0].value - 59_285.0).abs() < f64::EPSILON);
        assert_eq!(values[0].state_fips, "01");
        assert_eq!(values[0].county_fips, "001");
        assert_eq!(values[1].name, "Blount County, Alabama");
    }

    #[test]
    fn state_rows_build_a_fips_lookup() {
        let body = json!([
            ["NAME", "state"],
            ["Alabama", "01"],
            ["Alaska", "02"],
        ]);

        let states = parse_state_rows(&body, "test").unwrap();

        assert_eq!(states.get("01").map(String::as_str), Some("Alabama"));
        assert_eq!(states.get("02").map(String::as_str), Some("Alaska"));
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let body = json!({"error": "rate limited"});
        assert!(parse_county_rows(&body, "test").is_err());
        assert!(parse_state_rows(&body, "test").is_err());
    }

    #[test]
    fn numeric_understands_strings_numbers_and_markers() {
        assert_eq!(numeric(&json!("42.5")), Some(42.5));
        assert_eq!(numeric(&json!(42)), Some(42.0));
        assert_eq!(numeric(&json!(" 42 ")), Some(42.0));
        assert_eq!(numeric(&json!(null)), None);
        assert_eq!(numeric(&json!("-666666666")), None);
        assert_eq!(numeric(&json!(-5)), None);
        assert_eq!(numeric(&json!([1])), None);
    }
}
