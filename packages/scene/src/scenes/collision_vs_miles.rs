//! Scatterplot of collisions against miles driven, one point per location.

use async_trait::async_trait;
use av_story_analytics::summarize_by_location;
use av_story_dataset_models::Datasets;
use av_story_scene_models::{Interaction, SceneConfig, SceneId, Transition};

use super::{back_transition, drill_config, frame};
use crate::SceneError;
use crate::drawing::{Drawing, ScatterChart, ScatterPoint};
use crate::layout::{SceneDefaults, defaults_for};
use crate::registry::Scene;
use crate::render::{RenderContext, RenderOutcome};

#[derive(Debug, Clone)]
pub struct CollisionVsMilesScene {
    defaults: SceneDefaults,
}

impl Default for CollisionVsMilesScene {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionVsMilesScene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: defaults_for(SceneId::CollisionVsMiles),
        }
    }

    /// Builds the chart; `initialLocation` highlights its point.
    #[must_use]
    pub fn chart(&self, datasets: &Datasets, config: &SceneConfig) -> ScatterChart {
        let highlight = config.initial_location.as_deref();
        let points: Vec<ScatterPoint> = summarize_by_location(&datasets.mileage, &datasets.crashes)
            .iter()
            .map(|summary| {
                let mut point = ScatterPoint::from(summary);
                point.highlighted = highlight == Some(point.location.as_str());
                point
            })
            .collect();

        let max_miles = points.iter().map(|p| p.miles).fold(0.0_f64, f64::max);
        let max_collisions = points.iter().map(|p| p.collisions).max().unwrap_or(0);

        ScatterChart {
            frame: frame(&self.defaults, config),
            points,
            max_miles,
            max_collisions,
        }
    }
}

#[async_trait]
impl Scene for CollisionVsMilesScene {
    fn id(&self) -> SceneId {
        SceneId::CollisionVsMiles
    }

    async fn render(&self, ctx: RenderContext<'_>) -> Result<RenderOutcome, SceneError> {
        let Some(datasets) = ctx.datasets().await? else {
            return Ok(RenderOutcome::Stale);
        };
        let chart = self.chart(&datasets, ctx.config);
        log::info!("Drawing {} locations", chart.points.len());
        Ok(ctx.present(Drawing::Scatter(chart)))
    }

    fn interact(
        &self,
        interaction: &Interaction,
        config: &SceneConfig,
        _datasets: &Datasets,
    ) -> Option<Transition> {
        match interaction {
            Interaction::SelectPoint { location } => Some(Transition::new(
                SceneId::CollisionsByType,
                drill_config(SceneId::CollisionVsMiles, config.initial_location.clone())
                    .with_location(location.clone()),
            )),
            Interaction::Back => back_transition(config),
            Interaction::SelectBar { .. } | Interaction::Control { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::datasets;

    #[test]
    fn one_point_per_mileage_location() {
        let scene = CollisionVsMilesScene::new();
        let chart = scene.chart(&datasets(), &SceneConfig::default());

        let locations: Vec<&str> = chart.points.iter().map(|p| p.location.as_str()).collect();
        assert_eq!(locations, vec!["SITE_A", "SITE_B"]);
        assert_eq!(chart.points[0].collisions, 3);
        assert!((chart.points[0].ratio.unwrap() - 0.3).abs() < 1e-12);
        assert!(chart.points[0].ratio_finite);
        assert_eq!(chart.max_collisions, 3);
        assert!((chart.max_miles - 10.0).abs() < f64::EPSILON);
        assert!(chart.frame.back.is_none());
    }

    #[test]
    fn zero_miles_are_flagged_not_fatal() {
        let chart = CollisionVsMilesScene::new().chart(&datasets(), &SceneConfig::default());
        let site_b = &chart.points[1];
        assert_eq!(site_b.collisions, 1);
        assert_eq!(site_b.ratio, None);
        assert!(!site_b.ratio_finite);
    }

    #[test]
    fn initial_location_is_highlighted() {
        let config = SceneConfig::default().with_location("SITE_B");
        let chart = CollisionVsMilesScene::new().chart(&datasets(), &config);
        assert!(!chart.points[0].highlighted);
        assert!(chart.points[1].highlighted);
    }

    #[test]
    fn selecting_a_point_drills_into_types() {
        let scene = CollisionVsMilesScene::new();
        let transition = scene
            .interact(
                &Interaction::SelectPoint {
                    location: "SITE_A".to_owned(),
                },
                &SceneConfig::default(),
                &datasets(),
            )
            .unwrap();

        assert_eq!(transition.target, SceneId::CollisionsByType);
        assert_eq!(transition.config.initial_location.as_deref(), Some("SITE_A"));
        assert_eq!(transition.config.from_scene, Some(SceneId::CollisionVsMiles));
        assert_eq!(
            transition.to_params().to_query(),
            "scene=collisions-by-type&location=SITE_A&fromScene=collision-vs-miles"
        );
    }

    #[test]
    fn other_interactions_are_ignored() {
        let scene = CollisionVsMilesScene::new();
        let bar = Interaction::SelectBar {
            crash_type: "side".to_owned(),
            location: None,
        };
        assert!(scene.interact(&bar, &SceneConfig::default(), &datasets()).is_none());
        assert!(
            scene
                .interact(&Interaction::Back, &SceneConfig::default(), &datasets())
                .is_none()
        );
    }
}
