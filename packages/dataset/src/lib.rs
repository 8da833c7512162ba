#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loader and session cache for the mileage and crash tables.
//!
//! A [`DatasetSource`] fetches the raw CSV text for each table (from disk,
//! over HTTP, or from memory), [`decode`] turns it into normalized records,
//! and [`DatasetCache`] makes sure that happens at most once per session no
//! matter how many scenes ask for the data concurrently.

pub mod cache;
pub mod config;
pub mod decode;
pub mod source;

pub use av_story_dataset_models::Datasets;
pub use cache::DatasetCache;
pub use config::DatasetConfig;
pub use source::{DatasetSource, FileSource, HttpSource, StaticSource};

use std::sync::Arc;

use strum_macros::{AsRefStr, Display, EnumString};

/// The two source tables every scene depends on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum DatasetTable {
    /// Miles driven per location.
    Mileage,
    /// One row per reported crash.
    Crashes,
}

/// Errors that can occur while loading the datasets.
///
/// Cloneable so one failed load can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DatasetError {
    /// A table could not be fetched or decoded. Every scene needs both
    /// tables, so this is fatal for the session.
    #[error("Dataset '{table}' unavailable: {source}")]
    Unavailable {
        /// The table that failed.
        table: DatasetTable,
        /// What went wrong.
        source: Arc<FetchError>,
    },
}

impl DatasetError {
    /// Wraps a fetch/decode failure for `table`.
    #[must_use]
    pub fn unavailable(table: DatasetTable, source: FetchError) -> Self {
        Self::Unavailable {
            table,
            source: Arc::new(source),
        }
    }
}

/// Low-level failure while retrieving or parsing a table.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The source has nothing for the requested table, or the table is
    /// structurally unusable.
    #[error("{0}")]
    Missing(String),
}
