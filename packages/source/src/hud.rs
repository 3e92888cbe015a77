//! HUD Fair Market Rent fetcher.
//!
//! An authenticated walk of the FMR API: list states, list each state's
//! counties, then fetch per-county FMR figures. The two-bedroom FMR is
//! the figure the dataset treats as a county's median rent, so counties
//! without one are dropped. County requests within a state run
//! concurrently with a small bound to stay inside HUD's rate limits;
//! individual county failures are logged and skipped, but a rejected
//! token aborts the whole fetch.

use std::sync::Arc;

use county_compass_geography::fips;
use county_compass_source_models::RentRow;
use futures::StreamExt;
use futures::stream;
use serde_json::Value;

use crate::SourceError;
use crate::progress::ProgressCallback;
use crate::retry;

/// Environment variable holding the HUD API bearer token.
pub const API_KEY_ENV: &str = "HUD_API_KEY";

/// Concurrent per-county requests within one state.
const CONCURRENCY: usize = 8;

/// One county entry from `listCounties`.
struct HudCounty {
    /// The 10-digit FMR entity id used in data requests.
    entity_id: String,
    name: String,
    county_code: Option<u64>,
}

/// Fetches fair market rents for every county in every state.
///
/// Requires [`API_KEY_ENV`] to hold a HUD API token.
///
/// # Errors
///
/// Returns [`SourceError`] when the token is missing or rejected, or a
/// state-level request fails after retries.
pub async fn fetch_rents(
    client: &reqwest::Client,
    api_url: &str,
    year: u16,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RentRow>, SourceError> {
    let token = std::env::var(API_KEY_ENV).map_err(|_| SourceError::MissingEnv {
        name: API_KEY_ENV.to_string(),
    })?;
    let token = token.as_str();

    let states = list_states(client, api_url, token).await?;
    progress.set_total(states.len() as u64);
    log::info!("Fetching FMR data for {} states", states.len());

    let mut rows: Vec<RentRow> = Vec::new();
    for state_code in &states {
        progress.set_message(format!("{state_code} counties"));
        let counties = list_counties(client, api_url, token, state_code).await?;

        let results: Vec<Result<Option<RentRow>, SourceError>> = stream::iter(counties)
            .map(|county| async move {
                county_rent(client, api_url, token, state_code, &county, year).await
            })
            .buffer_unordered(CONCURRENCY)
            .collect()
            .await;

        for result in results {
            match result {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {}
                Err(e @ SourceError::Auth { .. }) => return Err(e),
                Err(e) => log::warn!("  county FMR fetch failed in {state_code}: {e}"),
            }
        }
        progress.inc(1);
    }

    // New England states list some counties once per town; keep one row
    // per county.
    rows.sort_by(|a, b| a.fips.cmp(&b.fips));
    rows.dedup_by(|a, b| a.fips == b.fips);
    Ok(rows)
}

async fn list_states(
    client: &reqwest::Client,
    api_url: &str,
    token: &str,
) -> Result<Vec<String>, SourceError> {
    let url = format!("{api_url}/fmr/listStates");
    let body = retry::send_json(|| client.get(&url).bearer_auth(token)).await?;
    let states = parse_state_codes(&body);
    if states.is_empty() {
        return Err(SourceError::UnexpectedPayload {
            message: format!("no states in response from {url}"),
        });
    }
    Ok(states)
}

async fn list_counties(
    client: &reqwest::Client,
    api_url: &str,
    token: &str,
    state_code: &str,
) -> Result<Vec<HudCounty>, SourceError> {
    let url = format!("{api_url}/fmr/listCounties/{state_code}");
    let body = retry::send_json(|| client.get(&url).bearer_auth(token)).await?;
    Ok(parse_counties(&body))
}

async fn county_rent(
    client: &reqwest::Client,
    api_url: &str,
    token: &str,
    state_code: &str,
    county: &HudCounty,
    year: u16,
) -> Result<Option<RentRow>, SourceError> {
    let url = format!("{api_url}/fmr/data/{}", county.entity_id);
    let body = retry::send_json(|| {
        client
            .get(&url)
            .bearer_auth(token)
            .query(&[("year", year.to_string())])
    })
    .await?;
    Ok(build_rent_row(state_code, county, &body, year))
}

/// Normalizes one FMR data response into a [`RentRow`].
///
/// Returns `None` when the county FIPS cannot be determined or the
/// response has no two-bedroom figure.
fn build_rent_row(state_code: &str, county: &HudCounty, body: &Value, year: u16) -> Option<RentRow> {
    let data = body.get("data")?;
    let basic = fmr_record(data)?;
    let median_rent = rent_value(basic, "Two-Bedroom")?;
    let fips = county_fips(state_code, county)?;

    Some(RentRow {
        fips,
        county: county.name.clone(),
        state: state_code.to_string(),
        median_rent,
        efficiency: rent_value(basic, "Efficiency"),
        one_bedroom: rent_value(basic, "One-Bedroom"),
        two_bedroom: Some(median_rent),
        three_bedroom: rent_value(basic, "Three-Bedroom"),
        four_bedroom: rent_value(basic, "Four-Bedroom"),
        year,
    })
}

/// Builds the 5-digit county FIPS, preferring the state abbreviation
/// plus HUD's numeric county code and falling back to the prefix of the
/// 10-digit entity id.
fn county_fips(state_code: &str, county: &HudCounty) -> Option<String> {
    if let (Some(code), Some(state_fips)) = (county.county_code, fips::abbr_to_fips(state_code)) {
        return Some(format!("{state_fips}{code:03}"));
    }
    let id = county.entity_id.as_str();
    (id.len() == 10 && id.bytes().all(|b| b.is_ascii_digit())).then(|| id[..5].to_string())
}

/// FMR figures live under `basicdata`, either a single object or an
/// array of small-area records for metro counties; the first array
/// entry carries the county-wide figures.
fn fmr_record(data: &Value) -> Option<&Value> {
    let basic = data.get("basicdata")?;
    if let Some(array) = basic.as_array() {
        return array.first();
    }
    Some(basic)
}

/// Reads one bedroom-size figure, tolerating both number and string
/// encodings.
fn rent_value(record: &Value, key: &str) -> Option<u64> {
    let value = record.get(key)?;
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value.as_str()?.trim().parse().ok()
}

/// HUD wraps list responses in a `data` object inconsistently across
/// endpoints; accept both a bare array and a wrapped one.
fn items(body: &Value) -> &[Value] {
    if let Some(array) = body.as_array() {
        return array;
    }
    body.get("data")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

fn parse_state_codes(body: &Value) -> Vec<String> {
    items(body)
        .iter()
        .filter_map(|item| item.get("state_code").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Parses `listCounties` entries, skipping town-level rows so each
/// county appears once.
fn parse_counties(body: &Value) -> Vec<HudCounty> {
    let mut counties = Vec::new();
    for item in items(body) {
        let town = item
            .get("town_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if !town.trim().is_empty() {
            continue;
        }
        let Some(entity_id) = item.get("fips_code").and_then(Value::as_str) else {
            continue;
        };
        let Some(name) = item.get("county_name").and_then(Value::as_str) else {
            continue;
        };
        let county_code = item.get("county_code").and_then(|code| {
            code.as_u64()
                .or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
        });
        counties.push(HudCounty {
            entity_id: entity_id.to_string(),
            name: name.to_string(),
            county_code,
        });
    }
    counties
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn autauga() -> HudCounty {
        HudCounty {
            entity_id: "0100199999".to_string(),
            name: "Autauga County".to_string(),
            county_code: Some(1),
        }
    }

    #[test]
    fn counties_parse_from_wrapped_and_bare_payloads() {
        let wrapped = json!({"data": [
            {"fips_code": "0100199999", "county_name": "Autauga County", "county_code": 1, "town_name": ""},
        ]});
        let bare = json!([
            {"fips_code": "0100399999", "county_name": "Baldwin County", "county_code": "3", "town_name": ""},
            {"fips_code": "0900199999", "county_name": "Fairfield County", "county_code": 1, "town_name": "Bethel"},
        ]);

        let from_wrapped = parse_counties(&wrapped);
        assert_eq!(from_wrapped.len(), 1);
        assert_eq!(from_wrapped[0].entity_id, "0100199999");
        assert_eq!(from_wrapped[0].county_code, Some(1));

        let from_bare = parse_counties(&bare);
        assert_eq!(from_bare.len(), 1, "town rows are skipped");
        assert_eq!(from_bare[0].county_code, Some(3));
    }

    #[test]
    fn state_codes_parse() {
        let body = json!({"data": [
            {"state_code": "AL", "state_name": "Alabama"},
            {"state_code": "AK", "state_name": "Alaska"},
        ]});
        assert_eq!(parse_state_codes(&body), vec!["AL", "AK"]);
    }

    #[test]
    fn basicdata_object_and_array_both_resolve() {
        let object = json!({"basicdata": {"Two-Bedroom": 900}});
        let array = json!({"basicdata": [
            {"Two-Bedroom": 950},
            {"Two-Bedroom": 1100},
        ]});

        assert_eq!(rent_value(fmr_record(&object).unwrap(), "Two-Bedroom"), Some(900));
        assert_eq!(rent_value(fmr_record(&array).unwrap(), "Two-Bedroom"), Some(950));
    }

    #[test]
    fn rent_row_requires_a_two_bedroom_figure() {
        let body = json!({"data": {"basicdata": {
            "Efficiency": 700, "One-Bedroom": 800,
        }}});
        assert!(build_rent_row("AL", &autauga(), &body, 2023).is_none());
    }

    #[test]
    fn rent_row_builds_with_all_sizes() {
        let body = json!({"data": {"basicdata": {
            "Efficiency": 700,
            "One-Bedroom": "800",
            "Two-Bedroom": 950,
            "Three-Bedroom": 1200,
            "Four-Bedroom": 1400,
        }}});

        let row = build_rent_row("AL", &autauga(), &body, 2023).unwrap();

        assert_eq!(row.fips, "01001");
        assert_eq!(row.state, "AL");
        assert_eq!(row.median_rent, 950);
        assert_eq!(row.one_bedroom, Some(800));
        assert_eq!(row.four_bedroom, Some(1400));
        assert_eq!(row.year, 2023);
    }

    #[test]
    fn county_fips_falls_back_to_the_entity_id_prefix() {
        let county = HudCounty {
            entity_id: "0101599999".to_string(),
            name: "Calhoun County".to_string(),
            county_code: None,
        };
        assert_eq!(county_fips("AL", &county), Some("01015".to_string()));

        let bad = HudCounty {
            entity_id: "not-a-fips".to_string(),
            name: "Unknown".to_string(),
            county_code: None,
        };
        assert_eq!(county_fips("AL", &bad), None);
    }
}
