//! Shows scenes by name and routes interactions into transitions.
//!
//! The dispatcher is a thin table around the registry. It does not clear
//! the surface itself; scenes do that right before drawing. What it adds is
//! a generation counter: every show takes a new [`RenderTicket`], so a slow
//! render that is overtaken by a newer one finds its ticket stale once its
//! data arrives and skips drawing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use av_story_dataset::DatasetCache;
use av_story_scene_models::{Interaction, SceneConfig, SceneId};

use crate::SceneError;
use crate::navigation::NavigationContext;
use crate::registry::{Scene, SceneRegistry};
use crate::render::{RenderContext, RenderOutcome, RenderTicket};
use crate::surface::Surface;

/// Result of a show request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The scene drew into the surface.
    Drawn(SceneId),
    /// A newer show started while this one was loading; nothing was drawn.
    Stale(SceneId),
    /// No scene is registered under the name. The surface is untouched.
    UnknownScene(String),
}

/// Routes show requests and interactions to registered scenes.
pub struct Dispatcher {
    registry: SceneRegistry,
    datasets: Arc<DatasetCache>,
    generation: AtomicU64,
    active: Mutex<Option<(SceneId, SceneConfig)>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: SceneRegistry, datasets: Arc<DatasetCache>) -> Self {
        Self {
            registry,
            datasets,
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn datasets(&self) -> &Arc<DatasetCache> {
        &self.datasets
    }

    /// Generation of the most recent show.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<(SceneId, SceneConfig)>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The scene that last drew, with the config it drew with.
    #[must_use]
    pub fn active(&self) -> Option<(SceneId, SceneConfig)> {
        self.lock_active().clone()
    }

    /// Shows the scene registered under `name` (a scene name or alias).
    ///
    /// Unknown names are not an error: they are logged and reported as
    /// [`ShowOutcome::UnknownScene`] without touching the surface.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    pub async fn show(
        &self,
        name: &str,
        config: SceneConfig,
        surface: &dyn Surface,
    ) -> Result<ShowOutcome, SceneError> {
        let Some(scene) = self.registry.resolve(name) else {
            log::warn!("Unknown scene '{name}', nothing to show");
            return Ok(ShowOutcome::UnknownScene(name.to_owned()));
        };
        self.show_scene(scene.as_ref(), config, surface).await
    }

    async fn show_scene(
        &self,
        scene: &dyn Scene,
        config: SceneConfig,
        surface: &dyn Surface,
    ) -> Result<ShowOutcome, SceneError> {
        let id = scene.id();
        let ticket = RenderTicket::issue(&self.generation);
        log::info!("Showing {id} (generation {})", ticket.generation());

        let ctx = RenderContext::new(&config, surface, ticket, &self.datasets);
        match scene.render(ctx).await? {
            RenderOutcome::Drawn => {
                *self.lock_active() = Some((id, config));
                Ok(ShowOutcome::Drawn(id))
            }
            RenderOutcome::Stale => Ok(ShowOutcome::Stale(id)),
        }
    }

    /// Passes `interaction` to the active scene. If the scene answers with a
    /// transition, records it in `nav` and shows the target.
    ///
    /// Returns `Ok(None)` when nothing is showing yet or the interaction has
    /// no effect.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    pub async fn interact(
        &self,
        interaction: &Interaction,
        nav: &mut NavigationContext,
        surface: &dyn Surface,
    ) -> Result<Option<ShowOutcome>, SceneError> {
        let Some((id, config)) = self.active() else {
            log::debug!("No active scene, ignoring {interaction:?}");
            return Ok(None);
        };
        let (Some(scene), Some(datasets)) = (self.registry.get(id), self.datasets.get()) else {
            return Ok(None);
        };
        let Some(transition) = scene.interact(interaction, &config, &datasets) else {
            log::debug!("{id} ignored {interaction:?}");
            return Ok(None);
        };

        log::info!("Transition {id} -> {}", transition.target);
        nav.push(transition.to_params());

        let Some(target) = self.registry.get(transition.target) else {
            log::warn!("Transition target {} is not registered", transition.target);
            return Ok(Some(ShowOutcome::UnknownScene(transition.target.to_string())));
        };
        self.show_scene(target.as_ref(), transition.config, surface)
            .await
            .map(Some)
    }

    /// Shows the state `nav` currently points at. Used for the initial page
    /// and after moving through history.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    pub async fn restore(
        &self,
        nav: &NavigationContext,
        surface: &dyn Surface,
    ) -> Result<ShowOutcome, SceneError> {
        let params = nav.current();
        self.show(&params.scene_name(), params.to_config(), surface)
            .await
    }

    /// Steps `nav` back and shows that state. `Ok(None)` at the start of
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    pub async fn back(
        &self,
        nav: &mut NavigationContext,
        surface: &dyn Surface,
    ) -> Result<Option<ShowOutcome>, SceneError> {
        if nav.back().is_none() {
            return Ok(None);
        }
        self.restore(nav, surface).await.map(Some)
    }

    /// Steps `nav` forward and shows that state. `Ok(None)` at the end of
    /// history.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    pub async fn forward(
        &self,
        nav: &mut NavigationContext,
        surface: &dyn Surface,
    ) -> Result<Option<ShowOutcome>, SceneError> {
        if nav.forward().is_none() {
            return Ok(None);
        }
        self.restore(nav, surface).await.map(Some)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("datasets", &self.datasets)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
