//! Per-category crash trends over time for one location.

use async_trait::async_trait;
use av_story_analytics::{build_category_time_series, distinct_locations};
use av_story_analytics_models::{CategorySeries, Dimension, Granularity, Selection};
use av_story_dataset_models::Datasets;
use av_story_scene_models::{ControlChange, Interaction, SceneConfig, SceneId, Transition};

use super::{back_transition, frame};
use crate::SceneError;
use crate::drawing::{Drawing, Select, TrendChart, TrendControls};
use crate::layout::{SceneDefaults, defaults_for};
use crate::registry::Scene;
use crate::render::{RenderContext, RenderOutcome};

#[derive(Debug, Clone)]
pub struct DimensionTrendsScene {
    defaults: SceneDefaults,
}

impl Default for DimensionTrendsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl DimensionTrendsScene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: defaults_for(SceneId::DimensionTrends),
        }
    }

    fn dimension(&self, config: &SceneConfig) -> Dimension {
        config
            .initial_dimension
            .clone()
            .or_else(|| self.defaults.dimension.clone())
            .unwrap_or_default()
    }

    fn granularity(&self, config: &SceneConfig) -> Granularity {
        config
            .initial_granularity
            .or(self.defaults.granularity)
            .unwrap_or_default()
    }

    /// Re-shows this scene with one control changed, keeping the back link.
    fn rerender(config: &SceneConfig, change: &ControlChange) -> Option<Transition> {
        let mut next = config.clone();
        match change {
            ControlChange::Location(location) => next.initial_location = Some(location.clone()),
            ControlChange::Dimension(dimension) => {
                next.initial_dimension = Some(dimension.clone());
            }
            ControlChange::Granularity(granularity) => {
                next.initial_granularity = Some(*granularity);
            }
            ControlChange::Locations(_) => return None,
        }
        Some(Transition::new(SceneId::DimensionTrends, next))
    }

    #[must_use]
    pub fn chart(&self, datasets: &Datasets, config: &SceneConfig) -> TrendChart {
        let locations = distinct_locations(&datasets.mileage, &datasets.crashes);
        // Only one location can be charted; a pooled or multiple selection
        // falls back to the first known location.
        let location = Selection::from_param(config.initial_location.as_deref(), &locations)
            .single()
            .map(str::to_owned)
            .or_else(|| locations.first().cloned())
            .unwrap_or_default();
        let dimension = self.dimension(config);
        let granularity = self.granularity(config);

        let trends =
            build_category_time_series(&datasets.crashes, &location, &dimension, granularity);
        let max_count = trends
            .series
            .iter()
            .map(CategorySeries::max_count)
            .max()
            .unwrap_or(0);

        let dimensions = [Dimension::Outcome, Dimension::CrashType]
            .iter()
            .map(ToString::to_string)
            .chain(datasets.crash_field_names())
            .collect();

        TrendChart {
            frame: frame(&self.defaults, config),
            controls: TrendControls {
                location: Select {
                    options: locations,
                    selected: location,
                },
                dimension: Select {
                    options: dimensions,
                    selected: dimension.to_string(),
                },
                granularity: Select {
                    options: Granularity::all().iter().map(ToString::to_string).collect(),
                    selected: granularity.to_string(),
                },
            },
            trends,
            max_count,
        }
    }
}

#[async_trait]
impl Scene for DimensionTrendsScene {
    fn id(&self) -> SceneId {
        SceneId::DimensionTrends
    }

    async fn render(&self, ctx: RenderContext<'_>) -> Result<RenderOutcome, SceneError> {
        let Some(datasets) = ctx.datasets().await? else {
            return Ok(RenderOutcome::Stale);
        };
        let chart = self.chart(&datasets, ctx.config);
        log::info!(
            "Drawing {} {} trends for {}",
            chart.trends.granularity,
            chart.trends.dimension,
            chart.trends.location
        );
        Ok(ctx.present(Drawing::Trends(chart)))
    }

    fn interact(
        &self,
        interaction: &Interaction,
        config: &SceneConfig,
        _datasets: &Datasets,
    ) -> Option<Transition> {
        match interaction {
            Interaction::Control { change } => Self::rerender(config, change),
            Interaction::Back => back_transition(config),
            Interaction::SelectPoint { .. } | Interaction::SelectBar { .. } => None,
        }
    }
}
