//! Per-render context handed to a [`Scene`](crate::Scene).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use av_story_dataset::DatasetCache;
use av_story_dataset_models::Datasets;
use av_story_scene_models::SceneConfig;

use crate::SceneError;
use crate::drawing::Drawing;
use crate::surface::Surface;

/// Identifies one render invocation.
///
/// The dispatcher bumps its generation counter on every show; a ticket
/// whose generation is no longer current belongs to a superseded render and
/// must not draw.
#[derive(Debug, Clone, Copy)]
pub struct RenderTicket<'a> {
    generation: u64,
    current: &'a AtomicU64,
}

impl<'a> RenderTicket<'a> {
    /// Takes the next generation from `counter`.
    #[must_use]
    pub fn issue(counter: &'a AtomicU64) -> Self {
        let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            generation,
            current: counter,
        }
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a newer render has been started since this ticket was issued.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.current.load(Ordering::SeqCst) != self.generation
    }
}

/// How a render ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The scene cleared the surface and drew.
    Drawn,
    /// The render was superseded while waiting for data; nothing was drawn.
    Stale,
}

/// Everything a scene needs for one render.
pub struct RenderContext<'a> {
    pub config: &'a SceneConfig,
    pub surface: &'a dyn Surface,
    pub ticket: RenderTicket<'a>,
    datasets: &'a DatasetCache,
}

impl<'a> RenderContext<'a> {
    #[must_use]
    pub fn new(
        config: &'a SceneConfig,
        surface: &'a dyn Surface,
        ticket: RenderTicket<'a>,
        datasets: &'a DatasetCache,
    ) -> Self {
        Self {
            config,
            surface,
            ticket,
            datasets,
        }
    }

    /// Awaits the session datasets.
    ///
    /// Returns `Ok(None)` when the render went stale while waiting, in which
    /// case the scene must return [`RenderOutcome::Stale`] without drawing.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    pub async fn datasets(&self) -> Result<Option<Arc<Datasets>>, SceneError> {
        let datasets = self.datasets.load().await?;
        if self.ticket.is_stale() {
            log::warn!(
                "Render generation {} superseded while loading data, skipping draw",
                self.ticket.generation()
            );
            return Ok(None);
        }
        Ok(Some(datasets))
    }

    /// Clears the surface and draws `drawing`.
    ///
    /// Nothing between the staleness check in [`RenderContext::datasets`] and
    /// this call suspends, so no other render can claim the surface in
    /// between.
    pub fn present(&self, drawing: Drawing) -> RenderOutcome {
        self.surface.clear();
        self.surface.draw(drawing);
        RenderOutcome::Drawn
    }
}
