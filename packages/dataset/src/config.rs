//! Environment-driven dataset location.

use std::sync::Arc;

use crate::source::{DatasetSource, FileSource, HttpSource, TableFiles};

/// Default data location, relative to the working directory.
pub const DEFAULT_DATA_LOCATION: &str = "data";

/// Where to load the tables from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// A directory path, or an `http(s)://` base URL.
    pub location: String,
    pub files: TableFiles,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_DATA_LOCATION.to_owned(),
            files: TableFiles::default(),
        }
    }
}

impl DatasetConfig {
    /// Reads `AV_STORY_DATA`, `AV_STORY_MILES_FILE` and
    /// `AV_STORY_CRASHES_FILE`, falling back to the defaults for any that
    /// are unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            location: std::env::var("AV_STORY_DATA").unwrap_or(defaults.location),
            files: TableFiles {
                mileage: std::env::var("AV_STORY_MILES_FILE").unwrap_or(defaults.files.mileage),
                crashes: std::env::var("AV_STORY_CRASHES_FILE")
                    .unwrap_or(defaults.files.crashes),
            },
        }
    }

    /// Overrides the data location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Whether the location is a remote base URL.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    /// Builds the matching [`DatasetSource`].
    #[must_use]
    pub fn source(&self) -> Arc<dyn DatasetSource> {
        if self.is_remote() {
            Arc::new(HttpSource::new(&self.location, self.files.clone()))
        } else {
            Arc::new(FileSource::new(&self.location, self.files.clone()))
        }
    }
}
