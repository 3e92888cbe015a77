#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! US geography lookup tables and normalization helpers.
//!
//! County datasets arrive keyed three different ways: 5-digit FIPS codes
//! (sometimes unpadded), two-letter postal abbreviations, and full state
//! names. This crate holds the state tables and the normalization rules
//! the merge pipeline uses to reconcile them.

pub mod fips;
pub mod names;
