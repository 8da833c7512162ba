#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation result types for the chart scenes.
//!
//! Everything here is derived from the loaded tables on demand and handed
//! to a renderer. None of it is cached across parameter changes.

use std::str::FromStr;

use av_story_dataset_models::{CRASH_TYPE_COLUMN, YearMonth};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Selector value meaning "every location, pooled".
pub const ALL_LOCATIONS: &str = "all";

/// Collisions against miles for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub location: String,
    /// Miles driven, in millions.
    pub miles: f64,
    pub collisions: u64,
    /// `collisions / miles`. Infinite or NaN when `miles` is zero; callers
    /// treat that as a display concern.
    pub ratio: f64,
}

impl LocationSummary {
    /// Whether [`LocationSummary::ratio`] can be plotted.
    #[must_use]
    pub const fn has_finite_ratio(&self) -> bool {
        self.ratio.is_finite()
    }
}

/// Which locations a chart covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "locations")]
pub enum Selection {
    /// Every location, treated as one pool.
    All,
    /// A set of discrete locations, in selection order.
    Locations(Vec<String>),
}

impl Selection {
    /// Exactly one location, taken verbatim.
    #[must_use]
    pub fn single_location(location: impl Into<String>) -> Self {
        Self::Locations(vec![location.into()])
    }

    /// Builds a selection from checked locations. An empty set falls back
    /// to [`Selection::All`] so the chart never dead-ends.
    #[must_use]
    pub fn from_checked<I, S>(locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for location in locations {
            let location = location.into();
            if !location.is_empty() && !unique.contains(&location) {
                unique.push(location);
            }
        }
        if unique.is_empty() {
            Self::All
        } else {
            Self::Locations(unique)
        }
    }

    /// Parses a navigation parameter.
    ///
    /// Absent or `"all"` selects everything. A value equal to one of `known`
    /// is that single location, commas included. Anything else is a list
    /// separated by `,`, where `\,` and `\\` stand for a literal comma and
    /// backslash. Values are never trimmed or case-folded.
    #[must_use]
    pub fn from_param(param: Option<&str>, known: &[String]) -> Self {
        match param {
            None | Some(ALL_LOCATIONS) => Self::All,
            Some(param) if known.iter().any(|location| location == param) => {
                Self::single_location(param)
            }
            Some(param) => Self::from_checked(split_escaped(param)),
        }
    }

    /// Whether `location` is covered.
    #[must_use]
    pub fn contains(&self, location: &str) -> bool {
        match self {
            Self::All => true,
            Self::Locations(locations) => locations.iter().any(|l| l == location),
        }
    }

    /// The single selected location, if exactly one is selected.
    #[must_use]
    pub fn single(&self) -> Option<&str> {
        match self {
            Self::Locations(locations) if locations.len() == 1 => Some(&locations[0]),
            _ => None,
        }
    }

    /// Whether the chart should break counts down per location.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        matches!(self, Self::Locations(locations) if locations.len() > 1)
    }

    /// Renders back to the navigation parameter form. A single location is
    /// written verbatim unless it would read as `"all"`.
    #[must_use]
    pub fn to_param(&self) -> String {
        match self {
            Self::All => ALL_LOCATIONS.to_owned(),
            Self::Locations(locations) => match locations.as_slice() {
                [location] if location != ALL_LOCATIONS => location.clone(),
                _ => locations
                    .iter()
                    .map(|location| escape(location))
                    .collect::<Vec<_>>()
                    .join(","),
            },
        }
    }
}

fn escape(location: &str) -> String {
    let mut escaped = String::with_capacity(location.len());
    for c in location.chars() {
        if matches!(c, ',' | '\\') || (escaped.is_empty() && location == ALL_LOCATIONS) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn split_escaped(param: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = param.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => current.extend(chars.next()),
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);
    items
}

/// Crash count for one crash type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashTypeCount {
    pub crash_type: String,
    pub count: u64,
}

/// Crash count at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCount {
    pub location: String,
    pub count: u64,
}

/// One stacked bar: a crash type broken down by selected location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedCrashTypeRow {
    pub crash_type: String,
    /// Sum across `by_location`.
    pub total: u64,
    /// One entry per selected location, in selection order.
    pub by_location: Vec<LocationCount>,
}

/// Time bucket width for series aggregation.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    #[default]
    Month,
    Year,
}

impl Granularity {
    /// All granularities, in control-panel order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Month, Self::Year]
    }

    /// Buckets a month at this granularity.
    #[must_use]
    pub const fn bucket(self, year_month: YearMonth) -> TimeBucket {
        match self {
            Self::Month => TimeBucket::Month(year_month),
            // Year is the YYYYMM encoding integer-divided by 100.
            Self::Year => TimeBucket::Year(year_month.year()),
        }
    }
}

/// A time bucket on a series axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeBucket {
    Month(YearMonth),
    Year(i32),
}

impl TimeBucket {
    /// First day of the bucket. `None` only for years chrono cannot
    /// represent.
    #[must_use]
    pub fn period_start(self) -> Option<NaiveDate> {
        match self {
            Self::Month(ym) => ym.first_day(),
            Self::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
        }
    }
}

/// The categorical attribute that splits a time series into series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Dimension {
    /// One series per outcome indicator.
    #[default]
    Outcome,
    /// One series per crash type.
    CrashType,
    /// One series per distinct value of an arbitrary crash column.
    Field(String),
}

impl Dimension {
    /// Parameter name of a dimension.
    #[must_use]
    pub fn as_param(&self) -> &str {
        match self {
            Self::Outcome => "outcome",
            Self::CrashType => "crashType",
            Self::Field(name) => name,
        }
    }
}

impl FromStr for Dimension {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "outcome" | "outcomes" => Self::Outcome,
            "crashType" | CRASH_TYPE_COLUMN => Self::CrashType,
            other => Self::Field(other.to_owned()),
        })
    }
}

impl From<String> for Dimension {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(dimension) => dimension,
            Err(never) => match never {},
        }
    }
}

impl From<Dimension> for String {
    fn from(value: Dimension) -> Self {
        value.as_param().to_owned()
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

/// One bucket of one category series.
///
/// `count` is `None` exactly when `has_data` is false: the location had no
/// observations at all in this period, which is different from observing
/// zero incidents of this category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub period_start: NaiveDate,
    pub count: Option<u64>,
    pub has_data: bool,
}

impl SeriesPoint {
    /// A bucket in which the location had observations.
    #[must_use]
    pub const fn observed(period_start: NaiveDate, count: u64) -> Self {
        Self {
            period_start,
            count: Some(count),
            has_data: true,
        }
    }

    /// A bucket with no observations at the location.
    #[must_use]
    pub const fn gap(period_start: NaiveDate) -> Self {
        Self {
            period_start,
            count: None,
            has_data: false,
        }
    }
}

/// A single category's counts over the global axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeries {
    pub key: String,
    pub values: Vec<SeriesPoint>,
}

impl CategorySeries {
    /// Splits the series into contiguous runs of observed buckets. Gaps end
    /// a run; they are never drawn as zero.
    #[must_use]
    pub fn segments(&self) -> Vec<Vec<(NaiveDate, u64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for point in &self.values {
            match point.count {
                Some(count) if point.has_data => current.push((point.period_start, count)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    /// Largest observed count, for axis scaling.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.values.iter().filter_map(|p| p.count).max().unwrap_or(0)
    }
}

/// Per-category time series for one location along the global axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTimeSeries {
    pub location: String,
    pub dimension: Dimension,
    pub granularity: Granularity,
    /// Bucket starts present anywhere in the crash table, ascending.
    pub axis: Vec<NaiveDate>,
    /// One series per category observed at the location.
    pub series: Vec<CategorySeries>,
    /// First bucket with any crash at the location.
    pub first_collision_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn empty_checked_selection_falls_back_to_all() {
        assert_eq!(Selection::from_checked(Vec::<String>::new()), Selection::All);
        assert_eq!(Selection::from_checked(["", ""]), Selection::All);
        assert_eq!(
            Selection::from_checked(["SITE_A", "", "SITE_A"]),
            Selection::single_location("SITE_A")
        );
    }

    #[test]
    fn selection_param_round_trips() {
        let selection = Selection::from_param(Some("SITE_A,SITE_B,SITE_A"), &[]);
        assert_eq!(
            selection,
            Selection::Locations(vec!["SITE_A".to_owned(), "SITE_B".to_owned()])
        );
        assert!(selection.is_multiple());
        assert_eq!(selection.single(), None);
        assert_eq!(selection.to_param(), "SITE_A,SITE_B");
        assert_eq!(Selection::from_param(None, &[]), Selection::All);
        assert_eq!(Selection::from_param(Some("all"), &[]), Selection::All);
    }

    #[test]
    fn locations_are_taken_verbatim() {
        let known = vec!["PHOENIX, AZ".to_owned(), " SITE_B".to_owned()];

        let single = Selection::from_param(Some("PHOENIX, AZ"), &known);
        assert_eq!(single, Selection::single_location("PHOENIX, AZ"));
        assert_eq!(single.to_param(), "PHOENIX, AZ");

        let padded = Selection::from_param(Some(" SITE_B"), &known);
        assert_eq!(padded.single(), Some(" SITE_B"));
    }

    #[test]
    fn lists_escape_commas_and_the_pooled_name() {
        let known = vec!["PHOENIX, AZ".to_owned(), "all".to_owned(), "A\\B".to_owned()];
        let selection = Selection::Locations(known.clone());

        let param = selection.to_param();
        assert_eq!(param, "PHOENIX\\, AZ,\\all,A\\\\B");
        assert_eq!(Selection::from_param(Some(&param), &known), selection);

        let named_all = Selection::single_location("all");
        assert_eq!(named_all.to_param(), "\\all");
        assert_eq!(Selection::from_param(Some(&named_all.to_param()), &known), named_all);
    }

    #[test]
    fn selection_matching_is_case_sensitive() {
        let selection = Selection::single_location("SITE_A");
        assert!(selection.contains("SITE_A"));
        assert!(!selection.contains("site_a"));
        assert_eq!(selection.single(), Some("SITE_A"));
        assert!(Selection::All.contains("anything"));
    }

    #[test]
    fn year_granularity_divides_encoding() {
        let ym = YearMonth::from_encoded(202_307).unwrap();
        assert_eq!(Granularity::Year.bucket(ym), TimeBucket::Year(2023));
        assert_eq!(Granularity::Year.bucket(ym).period_start(), Some(date(2023, 1)));
        assert_eq!(Granularity::Month.bucket(ym).period_start(), Some(date(2023, 7)));
    }

    #[test]
    fn dimension_parses_known_and_arbitrary_names() {
        assert_eq!("outcome".parse::<Dimension>().unwrap(), Dimension::Outcome);
        assert_eq!("crashType".parse::<Dimension>().unwrap(), Dimension::CrashType);
        assert_eq!("crash_type".parse::<Dimension>().unwrap(), Dimension::CrashType);
        assert_eq!(
            "weather".parse::<Dimension>().unwrap(),
            Dimension::Field("weather".to_owned())
        );
        assert_eq!(Dimension::CrashType.to_string(), "crashType");
    }

    #[test]
    fn segments_break_at_gaps() {
        let series = CategorySeries {
            key: "rear-end".to_owned(),
            values: vec![
                SeriesPoint::gap(date(2023, 1)),
                SeriesPoint::observed(date(2023, 2), 0),
                SeriesPoint::observed(date(2023, 3), 2),
                SeriesPoint::gap(date(2023, 4)),
                SeriesPoint::observed(date(2023, 5), 1),
            ],
        };
        let segments = series.segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], vec![(date(2023, 2), 0), (date(2023, 3), 2)]);
        assert_eq!(segments[1], vec![(date(2023, 5), 1)]);
        assert_eq!(series.max_count(), 2);
    }

    #[test]
    fn gaps_serialize_with_null_count() {
        let json = serde_json::to_value(SeriesPoint::gap(date(2023, 1))).unwrap();
        assert_eq!(json["count"], serde_json::Value::Null);
        assert_eq!(json["hasData"], serde_json::Value::Bool(false));
        assert_eq!(json["periodStart"], "2023-01-01");
    }
}
