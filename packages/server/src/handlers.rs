//! HTTP handler functions for the county explorer API.

use actix_web::{HttpResponse, web};
use county_compass_county_models::{CountyRecord, Metric};
use county_compass_geography::names;
use county_compass_scoring::classify;
use county_compass_server_models::{ApiHealth, ApiMetricPalette, ApiPalette, CountyQueryParams};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        counties: state.counties.len() as u64,
        dataset_version: state.version.to_string(),
    })
}

/// `GET /api/counties`
///
/// Returns every county record, optionally filtered to one state. The
/// filter accepts a full state name or postal abbreviation in any case.
pub async fn counties(
    state: web::Data<AppState>,
    params: web::Query<CountyQueryParams>,
) -> HttpResponse {
    let Some(filter) = params.state.as_deref() else {
        return HttpResponse::Ok().json(&state.counties);
    };

    let matches: Vec<&CountyRecord> = state
        .counties
        .iter()
        .filter(|county| state_matches(county, filter))
        .collect();
    HttpResponse::Ok().json(matches)
}

/// `GET /api/counties/{fips}`
///
/// Returns the single county with the given FIPS code, or 404.
pub async fn county_by_fips(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let fips = path.into_inner();
    let Some(county) = state.counties.iter().find(|county| county.fips == fips) else {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No county with FIPS {fips}")
        }));
    };
    HttpResponse::Ok().json(county)
}

/// `GET /api/stats`
///
/// Returns the summary statistics computed over the dataset at startup.
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.stats)
}

/// `GET /api/palette`
///
/// Returns the reference color palettes for the choropleth views.
pub async fn palette() -> HttpResponse {
    HttpResponse::Ok().json(palette_payload())
}

/// Whether a county belongs to the queried state.
fn state_matches(county: &CountyRecord, query: &str) -> bool {
    names::normalize_state(query) == names::normalize_state(&county.state)
}

fn palette_payload() -> ApiPalette {
    let metrics = Metric::all()
        .iter()
        .map(|metric| ApiMetricPalette {
            metric: *metric,
            colors: classify::metric_palette(*metric)
                .iter()
                .map(|color| (*color).to_string())
                .collect(),
        })
        .collect();

    ApiPalette {
        score: classify::COMBINED_PALETTE
            .iter()
            .map(|color| (*color).to_string())
            .collect(),
        unfiltered: classify::UNFILTERED_COLOR.to_string(),
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use county_compass_county_models::{
        Housing, Party, Rent, RentSizes, Temperature, VotePercentages, VoteTotals, Votes,
    };

    use super::*;

    #[test]
    fn state_filter_accepts_names_and_abbreviations() {
        let county = sample_county();
        assert!(state_matches(&county, "Alabama"));
        assert!(state_matches(&county, "alabama"));
        assert!(state_matches(&county, "AL"));
        assert!(state_matches(&county, "al"));
        assert!(!state_matches(&county, "Alaska"));
        assert!(!state_matches(&county, "AK"));
    }

    #[test]
    fn palette_covers_every_view() {
        let palette = palette_payload();
        assert_eq!(palette.score.len(), 9);
        assert_eq!(palette.unfiltered, classify::UNFILTERED_COLOR);
        assert_eq!(palette.metrics.len(), Metric::all().len());
        for view in &palette.metrics {
            assert_eq!(view.colors.len(), 9, "metric {}", view.metric);
        }
    }

    fn sample_county() -> CountyRecord {
        CountyRecord {
            fips: "01001".to_string(),
            name: "Autauga County".to_string(),
            state: "Alabama".to_string(),
            population: 59_285,
            median_age: 38.6,
            temperature: Temperature {
                avg_temp_f: 64.4,
                is_estimated: false,
            },
            votes: Votes {
                totals: VoteTotals {
                    democrat: 7_503,
                    republican: 19_838,
                    total: 27_770,
                },
                percentages: VotePercentages {
                    democrat: 27.02,
                    republican: 71.44,
                },
                winner: Party::Republican,
                is_estimated: false,
            },
            housing: Housing {
                median_home_value: 203_300,
                percent_national_median: None,
                is_estimated: false,
            },
            rent: Rent {
                median_rent: 1_171,
                sizes: RentSizes {
                    efficiency: 870,
                    one_bedroom: 875,
                    two_bedroom: 1_171,
                    three_bedroom: 1_549,
                    four_bedroom: 1_924,
                },
                is_estimated: false,
            },
        }
    }
}
