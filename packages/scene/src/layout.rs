//! Compile-time registry of per-scene defaults.
//!
//! Each scene's default geometry, colours and initial controls are defined
//! in a TOML file under `scenes/`. The files are embedded at compile time;
//! [`SceneConfig`](av_story_scene_models::SceneConfig) values override them
//! per render.

use av_story_analytics_models::{Dimension, Granularity};
use av_story_scene_models::{Layout, SceneId};
use serde::Deserialize;

/// Defaults for one scene, loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDefaults {
    pub scene: SceneId,
    pub layout: Layout,
    /// Initial dimension, for scenes with a dimension control.
    #[serde(default)]
    pub dimension: Option<Dimension>,
    /// Initial granularity, for scenes with a granularity control.
    #[serde(default)]
    pub granularity: Option<Granularity>,
}

// ── Compile-time embedded TOML files ────────────────────────────────

const SCENE_TOMLS: &[(&str, &str)] = &[
    (
        "collision_vs_miles",
        include_str!("../scenes/collision_vs_miles.toml"),
    ),
    (
        "collisions_by_type",
        include_str!("../scenes/collisions_by_type.toml"),
    ),
    (
        "dimension_trends",
        include_str!("../scenes/dimension_trends.toml"),
    ),
];

/// Returns the defaults of every scene.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_defaults() -> Vec<SceneDefaults> {
    SCENE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse scene defaults '{name}': {e}"))
        })
        .collect()
}

/// Returns the defaults for `scene`.
///
/// # Panics
///
/// Panics if the embedded configs do not cover `scene`.
#[must_use]
pub fn defaults_for(scene: SceneId) -> SceneDefaults {
    all_defaults()
        .into_iter()
        .find(|d| d.scene == scene)
        .unwrap_or_else(|| panic!("No embedded defaults for scene '{scene}'"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn every_scene_has_defaults() {
        let covered: BTreeSet<SceneId> = all_defaults().iter().map(|d| d.scene).collect();
        let expected: BTreeSet<SceneId> = SceneId::all().iter().copied().collect();
        assert_eq!(covered, expected);
        assert_eq!(all_defaults().len(), SceneId::all().len());
    }

    #[test]
    fn layouts_leave_room_to_plot() {
        for defaults in &all_defaults() {
            assert!(
                defaults.layout.inner_width() > 0 && defaults.layout.inner_height() > 0,
                "{} has no plot area",
                defaults.scene
            );
            assert!(!defaults.layout.point_color.is_empty());
            assert!(!defaults.layout.bar_color.is_empty());
        }
    }

    #[test]
    fn trends_defaults_pick_initial_controls() {
        let defaults = defaults_for(SceneId::DimensionTrends);
        assert_eq!(defaults.dimension, Some(Dimension::Outcome));
        assert_eq!(defaults.granularity, Some(Granularity::Month));
    }
}
