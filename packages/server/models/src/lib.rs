#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the county explorer server.
//!
//! These types are serialized to JSON for the REST API. County records
//! travel in their dataset wire shape as-is, so only the endpoints with
//! a payload of their own get a type here.

use county_compass_county_models::Metric;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
    /// Number of counties in the loaded dataset.
    pub counties: u64,
    /// SHA-256 fingerprint of the dataset file.
    pub dataset_version: String,
}

/// Query parameters for the counties endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountyQueryParams {
    /// State filter: full name or postal abbreviation, any case.
    pub state: Option<String>,
}

/// Color palettes for the front-end choropleth views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPalette {
    /// Combined-score view, bucket 1 (best) through 9 (worst).
    pub score: Vec<String>,
    /// Fill for counties the current configuration leaves unscored.
    pub unfiltered: String,
    /// Single-metric views, low values to high, in metric order.
    pub metrics: Vec<ApiMetricPalette>,
}

/// The quantile palette for one single-metric view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetricPalette {
    /// The metric this view colors.
    pub metric: Metric,
    /// Nine colors, lowest ninth of the dataset to highest.
    pub colors: Vec<String>,
}
