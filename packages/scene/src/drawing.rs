//! Chart payloads handed to a [`Surface`](crate::surface::Surface).
//!
//! A drawing is everything a renderer needs to put one scene on screen:
//! the resolved layout, the aggregated data, the control panel state, and
//! an optional back link. Axes, scales and shapes are the renderer's job.

use av_story_analytics_models::{
    CategoryTimeSeries, CrashTypeCount, LocationSummary, Selection, StackedCrashTypeRow,
};
use av_story_scene_models::{Layout, SceneId};
use serde::{Deserialize, Serialize};

/// One rendered scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "chart")]
pub enum Drawing {
    Scatter(ScatterChart),
    Bars(BarChart),
    Trends(TrendChart),
}

impl Drawing {
    /// Common chrome of the drawing.
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        match self {
            Self::Scatter(chart) => &chart.frame,
            Self::Bars(chart) => &chart.frame,
            Self::Trends(chart) => &chart.frame,
        }
    }
}

/// Chrome shared by every chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub scene: SceneId,
    pub title: String,
    pub layout: Layout,
    /// Present when the user arrived by clicking through from another scene.
    pub back: Option<BackLink>,
}

/// "Back" affordance pointing at the scene the user came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackLink {
    pub scene: SceneId,
    pub location: Option<String>,
    pub label: String,
}

/// One point of the collisions-vs-miles scatterplot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub location: String,
    pub miles: f64,
    pub collisions: u64,
    /// Collisions per million miles; `None` when the location has no miles.
    pub ratio: Option<f64>,
    pub ratio_finite: bool,
    pub highlighted: bool,
}

impl From<&LocationSummary> for ScatterPoint {
    fn from(summary: &LocationSummary) -> Self {
        Self {
            location: summary.location.clone(),
            miles: summary.miles,
            collisions: summary.collisions,
            ratio: summary.has_finite_ratio().then_some(summary.ratio),
            ratio_finite: summary.has_finite_ratio(),
            highlighted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterChart {
    pub frame: Frame,
    pub points: Vec<ScatterPoint>,
    /// Upper bound of the miles axis.
    pub max_miles: f64,
    /// Upper bound of the collisions axis.
    pub max_collisions: u64,
}

/// Bars of the collisions-by-type chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum BarSeries {
    /// One bar per crash type, counts pooled over the selection.
    Flat { bars: Vec<CrashTypeCount> },
    /// One stacked bar per crash type, one segment per location.
    Stacked {
        keys: Vec<String>,
        rows: Vec<StackedCrashTypeRow>,
    },
}

impl BarSeries {
    /// Largest bar height, for axis scaling.
    #[must_use]
    pub fn max_value(&self) -> u64 {
        match self {
            Self::Flat { bars } => bars.iter().map(|b| b.count).max().unwrap_or(0),
            Self::Stacked { rows, .. } => rows.iter().map(|r| r.total).max().unwrap_or(0),
        }
    }
}

/// A checkbox in the location filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOption {
    pub location: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub frame: Frame,
    pub selection: Selection,
    pub series: BarSeries,
    pub locations: Vec<CheckOption>,
}

/// A single-choice select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Select {
    pub options: Vec<String>,
    pub selected: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendControls {
    pub location: Select,
    pub dimension: Select,
    pub granularity: Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendChart {
    pub frame: Frame,
    pub trends: CategoryTimeSeries,
    pub controls: TrendControls,
    /// Upper bound of the count axis across every series.
    pub max_count: u64,
}
