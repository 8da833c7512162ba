//! Collisions by crash type, filtered by a location checklist.
//!
//! One selected location (or "all") draws flat bars; several selected
//! locations draw bars stacked by location.

use async_trait::async_trait;
use av_story_analytics::{count_by_crash_type, distinct_locations, stack_by_location};
use av_story_analytics_models::{Dimension, Selection};
use av_story_dataset_models::Datasets;
use av_story_scene_models::{ControlChange, Interaction, SceneConfig, SceneId, Transition};

use super::{back_transition, drill_config, frame};
use crate::SceneError;
use crate::drawing::{BarChart, BarSeries, CheckOption, Drawing};
use crate::layout::{SceneDefaults, defaults_for};
use crate::registry::Scene;
use crate::render::{RenderContext, RenderOutcome};

#[derive(Debug, Clone)]
pub struct CollisionsByTypeScene {
    defaults: SceneDefaults,
}

impl Default for CollisionsByTypeScene {
    fn default() -> Self {
        Self::new()
    }
}

fn selection(config: &SceneConfig, known: &[String]) -> Selection {
    Selection::from_param(config.initial_location.as_deref(), known)
}

impl CollisionsByTypeScene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: defaults_for(SceneId::CollisionsByType),
        }
    }

    #[must_use]
    pub fn chart(&self, datasets: &Datasets, config: &SceneConfig) -> BarChart {
        let known = distinct_locations(&datasets.mileage, &datasets.crashes);
        let selection = selection(config, &known);
        let series = match &selection {
            Selection::Locations(keys) if selection.is_multiple() => BarSeries::Stacked {
                keys: keys.clone(),
                rows: stack_by_location(&datasets.crashes, keys),
            },
            _ => BarSeries::Flat {
                bars: count_by_crash_type(&datasets.crashes, &selection),
            },
        };

        let locations = known
            .into_iter()
            .map(|location| CheckOption {
                checked: selection.contains(&location),
                location,
            })
            .collect();

        BarChart {
            frame: frame(&self.defaults, config),
            selection,
            series,
            locations,
        }
    }

    /// Re-shows this scene with a new selection, keeping the back link.
    fn reselect(config: &SceneConfig, selection: &Selection) -> Transition {
        let mut next = config.clone();
        next.initial_location = Some(selection.to_param());
        Transition::new(SceneId::CollisionsByType, next)
    }
}

#[async_trait]
impl Scene for CollisionsByTypeScene {
    fn id(&self) -> SceneId {
        SceneId::CollisionsByType
    }

    async fn render(&self, ctx: RenderContext<'_>) -> Result<RenderOutcome, SceneError> {
        let Some(datasets) = ctx.datasets().await? else {
            return Ok(RenderOutcome::Stale);
        };
        let chart = self.chart(&datasets, ctx.config);
        log::info!(
            "Drawing crash types for {} (max {})",
            chart.selection.to_param(),
            chart.series.max_value()
        );
        Ok(ctx.present(Drawing::Bars(chart)))
    }

    fn interact(
        &self,
        interaction: &Interaction,
        config: &SceneConfig,
        datasets: &Datasets,
    ) -> Option<Transition> {
        let known = distinct_locations(&datasets.mileage, &datasets.crashes);
        let current = selection(config, &known);
        match interaction {
            Interaction::SelectBar {
                crash_type,
                location,
            } => {
                let target = location
                    .clone()
                    .or_else(|| current.single().map(str::to_owned))
                    .or_else(|| known.first().cloned())?;
                log::info!("Drilling into '{crash_type}' crashes at {target}");

                let mut next = drill_config(SceneId::CollisionsByType, Some(current.to_param()))
                    .with_location(target);
                next.initial_dimension = Some(Dimension::CrashType);
                Some(Transition::new(SceneId::DimensionTrends, next))
            }
            Interaction::Control {
                change: ControlChange::Locations(checked),
            } => Some(Self::reselect(config, &Selection::from_checked(checked.iter().cloned()))),
            Interaction::Control {
                change: ControlChange::Location(location),
            } => Some(Self::reselect(
                config,
                &Selection::single_location(location.clone()),
            )),
            Interaction::Back => back_transition(config),
            Interaction::SelectPoint { .. } | Interaction::Control { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use av_story_analytics_models::{CrashTypeCount, LocationCount};
    use av_story_dataset_models::MileageRecord;
    use av_story_scene_models::NavigationParams;

    use super::*;
    use crate::fixtures::{crash, datasets};

    fn with_comma_location() -> Datasets {
        let mut datasets = datasets();
        datasets.mileage.push(MileageRecord {
            location: "PHOENIX, AZ".to_owned(),
            miles_millions: 2.0,
        });
        datasets.crashes.push(crash("PHOENIX, AZ", "side", 202_303));
        datasets
    }

    fn bar(crash_type: &str, count: u64) -> CrashTypeCount {
        CrashTypeCount {
            crash_type: crash_type.to_owned(),
            count,
        }
    }

    #[test]
    fn all_locations_pool_into_flat_bars() {
        let chart = CollisionsByTypeScene::new().chart(&datasets(), &SceneConfig::default());

        assert_eq!(chart.selection, Selection::All);
        assert_eq!(
            chart.series,
            BarSeries::Flat {
                bars: vec![bar("rear-end", 2), bar("side", 2), bar("pedestrian", 1)]
            }
        );
        assert_eq!(chart.locations.len(), 3);
        assert!(chart.locations.iter().all(|l| l.checked));
    }

    #[test]
    fn single_location_keeps_full_vocabulary() {
        let config = SceneConfig::default().with_location("SITE_B");
        let chart = CollisionsByTypeScene::new().chart(&datasets(), &config);

        assert_eq!(
            chart.series,
            BarSeries::Flat {
                bars: vec![bar("pedestrian", 1), bar("rear-end", 0), bar("side", 0)]
            }
        );
        let checked: Vec<&str> = chart
            .locations
            .iter()
            .filter(|l| l.checked)
            .map(|l| l.location.as_str())
            .collect();
        assert_eq!(checked, vec!["SITE_B"]);
    }

    #[test]
    fn several_locations_stack() {
        let config = SceneConfig::default().with_location("SITE_C,SITE_A");
        let chart = CollisionsByTypeScene::new().chart(&datasets(), &config);

        let BarSeries::Stacked { keys, rows } = &chart.series else {
            panic!("expected stacked bars, got {:?}", chart.series);
        };
        assert_eq!(keys, &vec!["SITE_C".to_owned(), "SITE_A".to_owned()]);
        assert_eq!(rows[0].crash_type, "rear-end");
        assert_eq!(rows[1].crash_type, "side");
        assert_eq!(rows[1].total, 2);
        assert_eq!(
            rows[1].by_location,
            vec![
                LocationCount {
                    location: "SITE_C".to_owned(),
                    count: 1
                },
                LocationCount {
                    location: "SITE_A".to_owned(),
                    count: 1
                },
            ]
        );
        assert_eq!(chart.series.max_value(), 2);
    }

    #[test]
    fn selecting_a_bar_opens_trends_by_crash_type() {
        let scene = CollisionsByTypeScene::new();
        let config = SceneConfig::default()
            .with_location("SITE_B")
            .with_origin(SceneId::CollisionVsMiles, None);
        let transition = scene
            .interact(
                &Interaction::SelectBar {
                    crash_type: "pedestrian".to_owned(),
                    location: None,
                },
                &config,
                &datasets(),
            )
            .unwrap();

        assert_eq!(transition.target, SceneId::DimensionTrends);
        assert_eq!(transition.config.initial_location.as_deref(), Some("SITE_B"));
        assert_eq!(transition.config.initial_dimension, Some(Dimension::CrashType));
        assert_eq!(transition.config.from_scene, Some(SceneId::CollisionsByType));
        assert_eq!(transition.config.from_location.as_deref(), Some("SITE_B"));
    }

    #[test]
    fn bar_location_wins_over_selection() {
        let scene = CollisionsByTypeScene::new();
        let select = |location: Option<&str>, config: &SceneConfig| {
            scene
                .interact(
                    &Interaction::SelectBar {
                        crash_type: "side".to_owned(),
                        location: location.map(str::to_owned),
                    },
                    config,
                    &datasets(),
                )
                .and_then(|t| t.config.initial_location)
        };

        let stacked = SceneConfig::default().with_location("SITE_A,SITE_C");
        assert_eq!(select(Some("SITE_C"), &stacked).as_deref(), Some("SITE_C"));
        assert_eq!(select(None, &SceneConfig::default()).as_deref(), Some("SITE_A"));
    }

    #[test]
    fn unchecking_everything_falls_back_to_all() {
        let scene = CollisionsByTypeScene::new();
        let config = SceneConfig::default()
            .with_location("SITE_A")
            .with_origin(SceneId::CollisionVsMiles, None);
        let transition = scene
            .interact(
                &Interaction::Control {
                    change: ControlChange::Locations(Vec::new()),
                },
                &config,
                &datasets(),
            )
            .unwrap();

        assert_eq!(transition.target, SceneId::CollisionsByType);
        assert_eq!(transition.config.initial_location.as_deref(), Some("all"));
        assert_eq!(transition.config.from_scene, Some(SceneId::CollisionVsMiles));
    }

    #[test]
    fn checking_locations_reselects() {
        let scene = CollisionsByTypeScene::new();
        let transition = scene
            .interact(
                &Interaction::Control {
                    change: ControlChange::Locations(vec![
                        "SITE_A".to_owned(),
                        "SITE_B".to_owned(),
                    ]),
                },
                &SceneConfig::default(),
                &datasets(),
            )
            .unwrap();
        assert_eq!(
            transition.config.initial_location.as_deref(),
            Some("SITE_A,SITE_B")
        );
    }

    #[test]
    fn back_returns_to_the_overview() {
        let scene = CollisionsByTypeScene::new();
        let config = SceneConfig::default()
            .with_location("SITE_A")
            .with_origin(SceneId::CollisionVsMiles, Some("SITE_A".to_owned()));
        let transition = scene
            .interact(&Interaction::Back, &config, &datasets())
            .unwrap();
        assert_eq!(transition.target, SceneId::CollisionVsMiles);
        assert_eq!(transition.config.initial_location.as_deref(), Some("SITE_A"));
    }

    #[test]
    fn location_with_a_comma_stays_one_location() {
        let scene = CollisionsByTypeScene::new();
        let datasets = with_comma_location();
        let config = SceneConfig::default()
            .with_location("PHOENIX, AZ")
            .with_origin(SceneId::CollisionVsMiles, None);

        let chart = scene.chart(&datasets, &config);
        assert_eq!(chart.selection, Selection::single_location("PHOENIX, AZ"));
        assert_eq!(
            chart.series,
            BarSeries::Flat {
                bars: vec![bar("side", 1), bar("rear-end", 0), bar("pedestrian", 0)]
            }
        );

        let restored = NavigationParams::from_query(
            &Transition::new(SceneId::CollisionsByType, config).to_params().to_query(),
        )
        .to_config();
        assert_eq!(scene.chart(&datasets, &restored).series, chart.series);
    }

    #[test]
    fn checked_locations_with_commas_survive_navigation() {
        let scene = CollisionsByTypeScene::new();
        let datasets = with_comma_location();
        let transition = scene
            .interact(
                &Interaction::Control {
                    change: ControlChange::Locations(vec![
                        "PHOENIX, AZ".to_owned(),
                        "SITE_A".to_owned(),
                    ]),
                },
                &SceneConfig::default(),
                &datasets,
            )
            .unwrap();

        let restored = NavigationParams::from_query(&transition.to_params().to_query()).to_config();
        let chart = scene.chart(&datasets, &restored);
        let BarSeries::Stacked { keys, .. } = &chart.series else {
            panic!("expected stacked bars, got {:?}", chart.series);
        };
        assert_eq!(keys, &vec!["PHOENIX, AZ".to_owned(), "SITE_A".to_owned()]);
    }
}
