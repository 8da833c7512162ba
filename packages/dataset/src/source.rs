//! Where the raw CSV text comes from.
//!
//! The loader only needs "give me the text of table X"; the three
//! implementations here cover a local data directory, a static file host,
//! and in-memory fixtures.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::{DatasetTable, FetchError};

/// Fetches the raw CSV text of a table.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable description used in log lines.
    fn describe(&self) -> String;

    /// Retrieves the full text of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the table cannot be retrieved.
    async fn fetch(&self, table: DatasetTable) -> Result<String, FetchError>;
}

/// File names for each table, shared by the file and HTTP sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFiles {
    pub mileage: String,
    pub crashes: String,
}

impl TableFiles {
    #[must_use]
    pub fn name(&self, table: DatasetTable) -> &str {
        match table {
            DatasetTable::Mileage => &self.mileage,
            DatasetTable::Crashes => &self.crashes,
        }
    }
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            mileage: "ro_miles_per_location.csv".to_owned(),
            crashes: "sgo_crashes.csv".to_owned(),
        }
    }
}

/// Reads tables from a local directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
    files: TableFiles,
}

impl FileSource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, files: TableFiles) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn fetch(&self, table: DatasetTable) -> Result<String, FetchError> {
        let path = self.dir.join(self.files.name(table));
        log::debug!("Reading {table} from {}", path.display());
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Downloads tables from a static file host.
#[derive(Debug, Clone)]
pub struct HttpSource {
    base_url: String,
    files: TableFiles,
    client: reqwest::Client,
}

impl HttpSource {
    /// Creates a source rooted at `base_url` (with or without a trailing
    /// slash).
    #[must_use]
    pub fn new(base_url: &str, files: TableFiles) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            files,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, table: DatasetTable) -> String {
        format!("{}/{}", self.base_url, self.files.name(table))
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch(&self, table: DatasetTable) -> Result<String, FetchError> {
        let url = self.url(table);
        log::debug!("Downloading {table} from {url}");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let text = response.text().await?;
        log::debug!("Downloaded {} bytes from {url}", text.len());
        Ok(text)
    }
}

/// Serves tables from in-memory strings.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    tables: BTreeMap<DatasetTable, String>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CSV text for `table`.
    #[must_use]
    pub fn with_table(mut self, table: DatasetTable, csv: impl Into<String>) -> Self {
        self.tables.insert(table, csv.into());
        self
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    fn describe(&self) -> String {
        "in-memory".to_owned()
    }

    async fn fetch(&self, table: DatasetTable) -> Result<String, FetchError> {
        self.tables
            .get(&table)
            .cloned()
            .ok_or_else(|| FetchError::Missing(format!("no in-memory data for {table}")))
    }
}
