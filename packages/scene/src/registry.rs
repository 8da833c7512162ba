//! The [`Scene`] interface and the registry mapping scene ids to scenes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use av_story_dataset_models::Datasets;
use av_story_scene_models::{Interaction, SceneConfig, SceneId, Transition};

use crate::SceneError;
use crate::render::{RenderContext, RenderOutcome};
use crate::scenes::{CollisionVsMilesScene, CollisionsByTypeScene, DimensionTrendsScene};

/// A chart scene.
#[async_trait]
pub trait Scene: Send + Sync {
    /// Identifier the scene is registered under.
    fn id(&self) -> SceneId;

    /// Loads data, aggregates, and draws into the context's surface.
    ///
    /// Implementations await the datasets first and draw only if the render
    /// is still current.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Dataset`] if the datasets cannot be loaded.
    async fn render(&self, ctx: RenderContext<'_>) -> Result<RenderOutcome, SceneError>;

    /// Decides where `interaction` leads when the scene is showing with
    /// `config`. `None` means the interaction has no effect.
    fn interact(
        &self,
        interaction: &Interaction,
        config: &SceneConfig,
        datasets: &Datasets,
    ) -> Option<Transition>;
}

/// Scenes by id.
#[derive(Default)]
pub struct SceneRegistry {
    scenes: BTreeMap<SceneId, Arc<dyn Scene>>,
}

impl SceneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the three story scenes.
    #[must_use]
    pub fn with_default_scenes() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CollisionVsMilesScene::new()));
        registry.register(Arc::new(CollisionsByTypeScene::new()));
        registry.register(Arc::new(DimensionTrendsScene::new()));
        registry
    }

    /// Registers `scene` under its id. A scene already registered under the
    /// same id is replaced and returned.
    pub fn register(&mut self, scene: Arc<dyn Scene>) -> Option<Arc<dyn Scene>> {
        let id = scene.id();
        let previous = self.scenes.insert(id, scene);
        if previous.is_some() {
            log::debug!("Replaced scene {id}");
        } else {
            log::debug!("Registered scene {id}");
        }
        previous
    }

    #[must_use]
    pub fn get(&self, id: SceneId) -> Option<Arc<dyn Scene>> {
        self.scenes.get(&id).cloned()
    }

    /// Looks a scene up by name or alias.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Scene>> {
        name.parse::<SceneId>().ok().and_then(|id| self.get(id))
    }

    /// Registered ids, in story order.
    #[must_use]
    pub fn ids(&self) -> Vec<SceneId> {
        self.scenes.keys().copied().collect()
    }
}

impl std::fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRegistry")
            .field("scenes", &self.ids())
            .finish()
    }
}
