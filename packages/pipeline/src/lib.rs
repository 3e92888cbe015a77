#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline that turns raw source tables into the typed county dataset.
//!
//! Three file-producing stages, run in order:
//!
//! 1. [`combine`] merges the six base tables into one row per county.
//! 2. [`fill`] overlays hand-curated estimates onto counties missing a
//!    metric group.
//! 3. [`build`] converts the merged rows to [`CountyRecord`]s and writes
//!    the dataset plus its manifest.
//!
//! Each stage reads its predecessor's output from disk, so a single stage
//! can be re-run while the data behind it is being iterated on.
//!
//! [`CountyRecord`]: county_compass_county_models::CountyRecord

pub mod build;
pub mod combine;
pub mod fill;

use std::path::{Path, PathBuf};

use county_compass_source::SourceError;

/// Errors from pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A source table could not be read or written.
    #[error("table error: {0}")]
    Table(#[from] SourceError),
    /// A filesystem operation outside of table handling failed.
    #[error("pipeline I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A JSON artifact could not be encoded or decoded.
    #[error("artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A stage input that must have rows has none.
    #[error("{} has no rows", path.display())]
    EmptyInput {
        /// The offending file.
        path: PathBuf,
    },
    /// No registered source carries the given id.
    #[error("unknown source id {id:?}")]
    UnknownSource {
        /// The id that failed to resolve.
        id: String,
    },
}

/// Standard layout under one data root: raw fetcher output in `base/`,
/// hand-curated estimate tables in `fill/`, stage artifacts in `final/`.
#[derive(Debug, Clone)]
pub struct DataDirs {
    /// Raw tables written by the fetchers.
    pub base: PathBuf,
    /// Optional estimate tables.
    pub fill: PathBuf,
    /// Combined, filled, and built artifacts.
    pub output: PathBuf,
}

impl DataDirs {
    /// Resolves the three stage directories under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            base: root.join("base"),
            fill: root.join("fill"),
            output: root.join("final"),
        }
    }
}

pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec(value)?)?;
    Ok(())
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    Ok(serde_json::from_slice(&std::fs::read(path)?)?)
}
