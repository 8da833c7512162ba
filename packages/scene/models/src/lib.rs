#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Scene identifiers, configuration and navigation types.
//!
//! The set of scenes is closed: every scene the story can show is a
//! [`SceneId`] variant. Scenes never call each other directly; a scene's
//! interaction handler returns a [`Transition`] describing where to go, and
//! the dispatcher turns that into [`NavigationParams`] and a new render.

use av_story_analytics_models::{Dimension, Granularity};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Every scene in the story.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum SceneId {
    /// Scatterplot of collisions against miles, one point per location.
    #[serde(rename = "collision-vs-miles", alias = "scene1")]
    #[strum(to_string = "collision-vs-miles", serialize = "scene1")]
    CollisionVsMiles,
    /// Collisions by crash type, flat or stacked by location.
    #[serde(rename = "collisions-by-type", alias = "scene2")]
    #[strum(to_string = "collisions-by-type", serialize = "scene2")]
    CollisionsByType,
    /// Per-category trends over time for one location.
    #[serde(rename = "dimension-trends", alias = "scene3")]
    #[strum(to_string = "dimension-trends", serialize = "scene3")]
    DimensionTrends,
}

impl SceneId {
    /// The scene shown when navigation names none.
    pub const DEFAULT: Self = Self::CollisionVsMiles;

    /// All scenes, in story order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CollisionVsMiles,
            Self::CollisionsByType,
            Self::DimensionTrends,
        ]
    }

    /// Short positional name (`scene1`, ...), accepted wherever a scene
    /// name is.
    #[must_use]
    pub const fn alias(self) -> &'static str {
        match self {
            Self::CollisionVsMiles => "scene1",
            Self::CollisionsByType => "scene2",
            Self::DimensionTrends => "scene3",
        }
    }

    /// Human-readable scene title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CollisionVsMiles => "Collisions vs. miles driven",
            Self::CollisionsByType => "Collisions by type",
            Self::DimensionTrends => "Dimension trends",
        }
    }
}

/// Chart margins, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// Fully resolved drawing geometry and colours for a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub margin: Margin,
    pub width: u32,
    pub height: u32,
    pub point_color: String,
    pub bar_color: String,
}

impl Layout {
    /// Plot area width inside the margins.
    #[must_use]
    pub const fn inner_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin.left)
            .saturating_sub(self.margin.right)
    }

    /// Plot area height inside the margins.
    #[must_use]
    pub const fn inner_height(&self) -> u32 {
        self.height
            .saturating_sub(self.margin.top)
            .saturating_sub(self.margin.bottom)
    }
}

/// Options a scene is shown with. Every field is optional; unset fields
/// fall back to the scene's defaults and unrecognized keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_color: Option<String>,
    /// Initial location filter: a location, a comma-separated list, or
    /// `"all"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_dimension: Option<Dimension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_granularity: Option<Granularity>,
    /// Scene the user clicked through from, for the back link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_scene: Option<SceneId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_location: Option<String>,
}

impl SceneConfig {
    /// Applies the geometry and colour overrides to `base`.
    #[must_use]
    pub fn layout(&self, base: &Layout) -> Layout {
        Layout {
            margin: self.margin.unwrap_or(base.margin),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            point_color: self
                .point_color
                .clone()
                .unwrap_or_else(|| base.point_color.clone()),
            bar_color: self
                .bar_color
                .clone()
                .unwrap_or_else(|| base.bar_color.clone()),
        }
    }

    /// Sets the initial location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.initial_location = Some(location.into());
        self
    }

    /// Records where the user came from.
    #[must_use]
    pub fn with_origin(mut self, scene: SceneId, location: Option<String>) -> Self {
        self.from_scene = Some(scene);
        self.from_location = location;
        self
    }
}

/// A user action inside a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Interaction {
    /// A scatterplot point was selected.
    SelectPoint { location: String },
    /// A bar (or one location's segment of a stacked bar) was selected.
    #[serde(rename_all = "camelCase")]
    SelectBar {
        crash_type: String,
        location: Option<String>,
    },
    /// A control-panel widget changed.
    Control { change: ControlChange },
    /// The back link was followed.
    Back,
}

/// A control-panel change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "control", content = "value")]
pub enum ControlChange {
    /// The set of checked locations. Empty means "all".
    Locations(Vec<String>),
    /// A single location picked from a select.
    Location(String),
    Dimension(Dimension),
    Granularity(Granularity),
}

/// Where to go next, as decided by a scene's interaction handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub target: SceneId,
    pub config: SceneConfig,
}

impl Transition {
    #[must_use]
    pub const fn new(target: SceneId, config: SceneConfig) -> Self {
        Self { target, config }
    }

    /// Navigation parameters that restore this transition on reload.
    #[must_use]
    pub fn to_params(&self) -> NavigationParams {
        NavigationParams {
            scene: Some(self.target.to_string()),
            location: self.config.initial_location.clone(),
            dimension: self.config.initial_dimension.as_ref().map(ToString::to_string),
            granularity: self.config.initial_granularity.map(|g| g.to_string()),
            from_scene: self.config.from_scene.map(|s| s.to_string()),
            from_location: self.config.from_location.clone(),
        }
    }
}

/// Query-string keys.
mod keys {
    pub const SCENE: &str = "scene";
    pub const LOCATION: &str = "location";
    pub const DIMENSION: &str = "dimension";
    pub const GRANULARITY: &str = "granularity";
    pub const FROM_SCENE: &str = "fromScene";
    pub const FROM_LOCATION: &str = "fromLocation";
}

/// The addressable navigation state (the page's query string).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationParams {
    /// Raw scene name; may name a scene that does not exist.
    pub scene: Option<String>,
    pub location: Option<String>,
    pub dimension: Option<String>,
    pub granularity: Option<String>,
    pub from_scene: Option<String>,
    pub from_location: Option<String>,
}

impl NavigationParams {
    /// Parses a query string, with or without the leading `?`. Unknown keys
    /// are ignored; empty values count as absent; the last occurrence of a
    /// repeated key wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.trim().trim_start_matches('?');
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = (!value.is_empty()).then(|| value.into_owned());
            match key.as_ref() {
                keys::SCENE => params.scene = value,
                keys::LOCATION => params.location = value,
                keys::DIMENSION => params.dimension = value,
                keys::GRANULARITY => params.granularity = value,
                keys::FROM_SCENE => params.from_scene = value,
                keys::FROM_LOCATION => params.from_location = value,
                _ => {}
            }
        }
        params
    }

    /// Renders the params as a query string (without the leading `?`).
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let pairs = [
            (keys::SCENE, &self.scene),
            (keys::LOCATION, &self.location),
            (keys::DIMENSION, &self.dimension),
            (keys::GRANULARITY, &self.granularity),
            (keys::FROM_SCENE, &self.from_scene),
            (keys::FROM_LOCATION, &self.from_location),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    /// Scene name to show, defaulting to the overview scene.
    #[must_use]
    pub fn scene_name(&self) -> String {
        self.scene
            .clone()
            .unwrap_or_else(|| SceneId::DEFAULT.to_string())
    }

    /// Scene config carrying the deep-linked filter state. Unparseable
    /// granularity or origin scene values are dropped.
    #[must_use]
    pub fn to_config(&self) -> SceneConfig {
        SceneConfig {
            initial_location: self.location.clone(),
            initial_dimension: self.dimension.as_deref().map(|d| Dimension::from(d.to_owned())),
            initial_granularity: self.granularity.as_deref().and_then(|g| g.parse().ok()),
            from_scene: self.from_scene.as_deref().and_then(|s| s.parse().ok()),
            from_location: self.from_location.clone(),
            ..SceneConfig::default()
        }
    }
}
