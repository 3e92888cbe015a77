#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County data source definitions and fetchers.
//!
//! Every upstream provider (Census ACS, HUD Fair Market Rents, NOAA
//! nClimGrid, county election results) is described by a TOML config
//! embedded at compile time (see [`registry`]) and fetched by a matching
//! implementation in this crate. Fetchers normalize provider payloads
//! into the row types from `county_compass_source_models` and each one
//! writes a single FIPS-sorted base CSV table, which the combine
//! pipeline later joins into the dataset.

pub mod acs;
pub mod elections;
pub mod hud;
pub mod noaa;
pub mod progress;
pub mod registry;
pub mod retry;
pub mod source_def;
pub mod tables;

use std::path::PathBuf;

/// Errors that can occur while fetching or writing source data.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a status we do not retry.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The response status code.
        status: reqwest::StatusCode,
        /// The request URL, for log context.
        url: String,
    },

    /// Server rejected the request credentials.
    #[error("authentication rejected by {url}")]
    Auth {
        /// The request URL that returned 401.
        url: String,
    },

    /// A required environment variable is not set.
    #[error("missing required environment variable {name}")]
    MissingEnv {
        /// Name of the unset variable.
        name: String,
    },

    /// Response body could not be parsed as JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV read or write failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File or archive I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider returned data in a shape we do not understand.
    #[error("unexpected payload: {message}")]
    UnexpectedPayload {
        /// Description of what did not line up.
        message: String,
    },
}

/// Options shared by every fetcher run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Directory that receives the base CSV tables.
    pub output_dir: PathBuf,
    /// Keep only this many rows per table (smoke runs); `None` keeps
    /// everything.
    pub limit: Option<u64>,
}
