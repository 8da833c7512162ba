//! Session-scoped, fetch-once dataset cache.
//!
//! The cache is an owned value rather than a global: the CLI creates one per
//! run and hands it to the dispatcher, and tests inject a pre-populated one
//! with [`DatasetCache::preloaded`].

use std::sync::{Arc, Mutex, PoisonError};

use av_story_dataset_models::Datasets;
use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use tokio::sync::OnceCell;

use crate::source::{DatasetSource, StaticSource};
use crate::{DatasetError, DatasetTable, decode};

type LoadAttempt = Shared<BoxFuture<'static, Result<Arc<Datasets>, DatasetError>>>;

/// Lazily loads both tables once and shares the result.
///
/// Concurrent callers of [`DatasetCache::load`] all await the same in-flight
/// attempt and all receive its outcome, success or failure. A failed attempt
/// is not cached; only a call made after it has finished starts a new one.
pub struct DatasetCache {
    source: Arc<dyn DatasetSource>,
    cell: OnceCell<Arc<Datasets>>,
    in_flight: Mutex<Option<LoadAttempt>>,
}

impl DatasetCache {
    #[must_use]
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self {
            source,
            cell: OnceCell::new(),
            in_flight: Mutex::new(None),
        }
    }

    /// Creates a cache that already holds `datasets` and never fetches.
    #[must_use]
    pub fn preloaded(datasets: Datasets) -> Self {
        Self {
            source: Arc::new(StaticSource::new()),
            cell: OnceCell::new_with(Some(Arc::new(datasets))),
            in_flight: Mutex::new(None),
        }
    }

    /// Returns the datasets if they have already been loaded.
    #[must_use]
    pub fn get(&self) -> Option<Arc<Datasets>> {
        self.cell.get().cloned()
    }

    /// Returns the datasets, fetching and decoding them on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Unavailable`] if either table cannot be
    /// fetched or decoded.
    pub async fn load(&self) -> Result<Arc<Datasets>, DatasetError> {
        if let Some(datasets) = self.cell.get() {
            log::debug!("Dataset cache hit");
            return Ok(Arc::clone(datasets));
        }

        let attempt = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(datasets) = self.cell.get() {
                return Ok(Arc::clone(datasets));
            }
            in_flight
                .get_or_insert_with(|| {
                    fetch_all(Arc::clone(&self.source))
                        .map(|result| result.map(Arc::new))
                        .boxed()
                        .shared()
                })
                .clone()
        };

        let result = attempt.clone().await;

        if let Ok(datasets) = &result {
            if self.cell.set(Arc::clone(datasets)).is_err() {
                log::trace!("Datasets already stored by another caller");
            }
        }

        // Forget the finished attempt so a later call can try again; the cell
        // is filled first, so a success is never fetched twice.
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&attempt))
        {
            *in_flight = None;
        }

        result
    }
}

async fn fetch_all(source: Arc<dyn DatasetSource>) -> Result<Datasets, DatasetError> {
    log::info!("Loading datasets from {}", source.describe());

    let (mileage, crashes) = tokio::join!(
        source.fetch(DatasetTable::Mileage),
        source.fetch(DatasetTable::Crashes),
    );

    let mileage = mileage
        .and_then(|text| decode::decode_mileage(&text))
        .map_err(|e| DatasetError::unavailable(DatasetTable::Mileage, e))?;
    let crashes = crashes
        .and_then(|text| decode::decode_crashes(&text))
        .map_err(|e| DatasetError::unavailable(DatasetTable::Crashes, e))?;

    log::info!(
        "Loaded {} mileage rows and {} crash rows",
        mileage.len(),
        crashes.len()
    );

    Ok(Datasets { mileage, crashes })
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("source", &self.source.describe())
            .field("loaded", &self.cell.initialized())
            .finish()
    }
}
