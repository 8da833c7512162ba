#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scene registry, dispatcher and the three story scenes.
//!
//! Scenes implement [`Scene`] and are registered by [`SceneId`] in a
//! [`SceneRegistry`]. The [`Dispatcher`] owns the registry and the session's
//! [`DatasetCache`](av_story_dataset::DatasetCache); it resolves scene names,
//! hands out render tickets so that a superseded render never draws, and
//! turns a scene's [`Transition`](av_story_scene_models::Transition) into
//! navigation history plus the next render.

pub mod dispatcher;
pub mod drawing;
pub mod layout;
pub mod navigation;
pub mod registry;
pub mod render;
pub mod scenes;
pub mod surface;

pub use av_story_scene_models::SceneId;
pub use dispatcher::{Dispatcher, ShowOutcome};
pub use drawing::Drawing;
pub use navigation::NavigationContext;
pub use registry::{Scene, SceneRegistry};
pub use render::{RenderContext, RenderOutcome, RenderTicket};
pub use surface::{MemorySurface, Surface};

use av_story_dataset::DatasetError;

/// Errors that can occur while showing a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// The datasets could not be loaded. Nothing renders for the rest of the
    /// session.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}
