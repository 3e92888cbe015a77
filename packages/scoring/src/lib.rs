#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The county scoring engine.
//!
//! Pure functions from a loaded dataset and a filter configuration to
//! scores, ranks, buckets, and colors. Nothing here performs I/O or holds
//! state: per-dataset statistics are computed once via
//! [`stats::summarize`] and every other call takes them as an argument,
//! so interactive filter changes never trigger a recomputation pass.
//!
//! The scoring model in one breath: each enabled metric whose requested
//! range actually narrows the dataset's bounds contributes a deviation
//! (0 at the range center, 0.3 at the edges, climbing in half-stdev
//! units past them), and a county's score is the importance-weighted
//! mean of those deviations. Lower is better. `None` means the
//! configuration expressed no preference at all.

pub mod classify;
pub mod composite;
pub mod preset;
pub mod rank;
pub mod score;
pub mod stats;

#[cfg(test)]
pub(crate) mod test_support;
