#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-scene aggregations over the mileage and crash tables.
//!
//! Every function here is a synchronous, pure transformation of rows that
//! are already in memory. Absent data is always representable (zero counts,
//! `None` with `has_data = false`), so nothing in this crate can fail.

pub mod crash_types;
pub mod summary;
pub mod trends;

pub use crash_types::{count_by_crash_type, crash_type_vocabulary, stack_by_location};
pub use summary::{distinct_locations, summarize_by_location};
pub use trends::{build_category_time_series, category_vocabulary, time_axis};
