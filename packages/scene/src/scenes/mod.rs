//! The three story scenes.

mod collision_vs_miles;
mod collisions_by_type;
mod dimension_trends;

pub use collision_vs_miles::CollisionVsMilesScene;
pub use collisions_by_type::CollisionsByTypeScene;
pub use dimension_trends::DimensionTrendsScene;

use av_story_scene_models::{SceneConfig, SceneId, Transition};

use crate::drawing::{BackLink, Frame};
use crate::layout::SceneDefaults;

/// Frame for `defaults.scene` with `config`'s overrides and back link.
fn frame(defaults: &SceneDefaults, config: &SceneConfig) -> Frame {
    Frame {
        scene: defaults.scene,
        title: defaults.scene.title().to_owned(),
        layout: config.layout(&defaults.layout),
        back: config.from_scene.map(|scene| BackLink {
            scene,
            location: config.from_location.clone(),
            label: format!("Back to {}", scene.title()),
        }),
    }
}

/// Where the back link leads, restoring the origin scene's location.
fn back_transition(config: &SceneConfig) -> Option<Transition> {
    let target = config.from_scene?;
    let mut next = SceneConfig::default();
    next.initial_location.clone_from(&config.from_location);
    log::info!("Returning to {target}");
    Some(Transition::new(target, next))
}

/// Scenes navigated to from `scene` record it as their origin.
fn drill_config(scene: SceneId, origin_location: Option<String>) -> SceneConfig {
    SceneConfig::default().with_origin(scene, origin_location)
}

#[cfg(test)]
mod tests {
    use av_story_scene_models::Margin;

    use super::*;
    use crate::layout::defaults_for;

    #[test]
    fn frame_applies_overrides_and_back_link() {
        let defaults = defaults_for(SceneId::CollisionsByType);
        let config = SceneConfig {
            width: Some(320),
            margin: Some(Margin {
                top: 0,
                right: 0,
                bottom: 0,
                left: 0,
            }),
            ..drill_config(SceneId::CollisionVsMiles, Some("SITE_A".to_owned()))
        };

        let frame = frame(&defaults, &config);
        assert_eq!(frame.scene, SceneId::CollisionsByType);
        assert_eq!(frame.layout.width, 320);
        assert_eq!(frame.layout.inner_width(), 320);
        assert_eq!(frame.layout.height, defaults.layout.height);

        let back = frame.back.unwrap();
        assert_eq!(back.scene, SceneId::CollisionVsMiles);
        assert_eq!(back.location.as_deref(), Some("SITE_A"));
        assert_eq!(back.label, "Back to Collisions vs. miles driven");
    }

    #[test]
    fn no_origin_means_no_back() {
        let defaults = defaults_for(SceneId::CollisionVsMiles);
        assert!(frame(&defaults, &SceneConfig::default()).back.is_none());
        assert!(back_transition(&SceneConfig::default()).is_none());
    }

    #[test]
    fn back_restores_origin_location() {
        let config = drill_config(SceneId::CollisionsByType, Some("SITE_A,SITE_B".to_owned()))
            .with_location("SITE_A");
        let transition = back_transition(&config).unwrap();
        assert_eq!(transition.target, SceneId::CollisionsByType);
        assert_eq!(
            transition.config.initial_location.as_deref(),
            Some("SITE_A,SITE_B")
        );
        assert!(transition.config.from_scene.is_none());
    }
}
