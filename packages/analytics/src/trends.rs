//! Per-category crash trends for one location on a shared time axis.
//!
//! The axis is global (every bucket present anywhere in the crash table) so
//! locations can be compared side by side, while the category vocabulary is
//! local (only what was observed at the location). Buckets in which the
//! location had no crashes at all are gaps (`has_data = false`), never
//! zeros.

use std::collections::{BTreeMap, BTreeSet};

use av_story_analytics_models::{
    CategorySeries, CategoryTimeSeries, Dimension, Granularity, SeriesPoint, TimeBucket,
};
use av_story_dataset_models::{CrashRecord, OutcomeKind, YearMonth};
use chrono::NaiveDate;

/// Every bucket present anywhere in the crash table, ascending. Undated
/// crashes are ignored.
#[must_use]
pub fn time_axis(crashes: &[CrashRecord], granularity: Granularity) -> Vec<TimeBucket> {
    crashes
        .iter()
        .filter_map(|c| c.year_month)
        .map(|ym| granularity.bucket(ym))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Categories a single crash contributes to under `dimension`.
fn row_categories<'a>(crash: &'a CrashRecord, dimension: &Dimension) -> Vec<&'a str> {
    match dimension {
        Dimension::Outcome => OutcomeKind::all()
            .iter()
            .filter(|kind| crash.outcomes.get(**kind))
            .map(|kind| kind.as_ref())
            .collect(),
        Dimension::CrashType => vec![crash.crash_type.as_str()],
        Dimension::Field(name) => crash.field(name).into_iter().collect(),
    }
}

/// Dated crashes at `location`.
fn dated_at<'a>(
    crashes: &'a [CrashRecord],
    location: &'a str,
) -> impl Iterator<Item = (&'a CrashRecord, YearMonth)> + 'a {
    crashes
        .iter()
        .filter(move |c| c.location == location)
        .filter_map(|c| c.year_month.map(|ym| (c, ym)))
}

/// Categories observed at `location` under `dimension`, in first-seen
/// order.
///
/// Outcome indicators are columns of every row, so a location with any
/// dated crash reports all of them; a location without crashes reports
/// none.
#[must_use]
pub fn category_vocabulary(
    crashes: &[CrashRecord],
    location: &str,
    dimension: &Dimension,
) -> Vec<String> {
    if *dimension == Dimension::Outcome {
        return if dated_at(crashes, location).next().is_some() {
            OutcomeKind::all().iter().map(ToString::to_string).collect()
        } else {
            Vec::new()
        };
    }

    let mut vocabulary: Vec<String> = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for (crash, _) in dated_at(crashes, location) {
        for category in row_categories(crash, dimension) {
            if seen.insert(category) {
                vocabulary.push(category.to_owned());
            }
        }
    }
    vocabulary
}

/// Builds one series per category observed at `location`, aligned to the
/// global axis at `granularity`.
///
/// For every bucket on the axis, a category's point is a gap when the
/// location has no crashes in that bucket at all, and an observed count
/// (possibly zero) otherwise. `first_collision_date` is the first bucket in
/// which the location has any crash.
#[must_use]
pub fn build_category_time_series(
    crashes: &[CrashRecord],
    location: &str,
    dimension: &Dimension,
    granularity: Granularity,
) -> CategoryTimeSeries {
    let axis: Vec<(TimeBucket, NaiveDate)> = time_axis(crashes, granularity)
        .into_iter()
        .filter_map(|bucket| {
            let start = bucket.period_start();
            if start.is_none() {
                log::warn!("Dropping unrepresentable time bucket {bucket:?}");
            }
            start.map(|s| (bucket, s))
        })
        .collect();

    let mut active: BTreeSet<TimeBucket> = BTreeSet::new();
    let mut counts: BTreeMap<&str, BTreeMap<TimeBucket, u64>> = BTreeMap::new();
    for (crash, ym) in dated_at(crashes, location) {
        let bucket = granularity.bucket(ym);
        active.insert(bucket);
        for category in row_categories(crash, dimension) {
            *counts
                .entry(category)
                .or_default()
                .entry(bucket)
                .or_default() += 1;
        }
    }

    let series = category_vocabulary(crashes, location, dimension)
        .into_iter()
        .map(|key| {
            let by_bucket = counts.get(key.as_str());
            let values = axis
                .iter()
                .map(|(bucket, start)| {
                    if active.contains(bucket) {
                        let count = by_bucket
                            .and_then(|b| b.get(bucket))
                            .copied()
                            .unwrap_or(0);
                        SeriesPoint::observed(*start, count)
                    } else {
                        SeriesPoint::gap(*start)
                    }
                })
                .collect();
            CategorySeries { key, values }
        })
        .collect();

    let first_collision_date = active.first().and_then(|b| b.period_start());

    log::debug!(
        "Built {dimension} trends for {location}: {} buckets, first collision {first_collision_date:?}",
        axis.len()
    );

    CategoryTimeSeries {
        location: location.to_owned(),
        dimension: dimension.clone(),
        granularity,
        axis: axis.into_iter().map(|(_, start)| start).collect(),
        series,
        first_collision_date,
    }
}

#[cfg(test)]
mod tests {
    use av_story_dataset_models::OutcomeFlags;

    use super::*;
    use crate::fixtures::crash;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn with_outcomes(mut record: CrashRecord, any_injury: bool, airbag: bool) -> CrashRecord {
        record.outcomes = OutcomeFlags {
            any_injury,
            airbag_deployment: airbag,
            suspected_serious_injury: false,
        };
        record
    }

    fn sample() -> Vec<CrashRecord> {
        vec![
            crash("SITE_A", "rear-end", 202_301),
            crash("SITE_A", "side", 202_303),
            crash("SITE_B", "pedestrian", 202_302),
            crash("SITE_B", "rear-end", 202_212),
        ]
    }

    #[test]
    fn single_bucket_example() {
        let crashes = vec![
            crash("SITE_A", "rear-end", 202_301),
            crash("SITE_A", "rear-end", 202_301),
        ];
        let trends =
            build_category_time_series(&crashes, "SITE_A", &Dimension::CrashType, Granularity::Month);

        assert_eq!(trends.axis, vec![date(2023, 1)]);
        assert_eq!(trends.series.len(), 1);
        assert_eq!(trends.series[0].key, "rear-end");
        assert_eq!(
            trends.series[0].values,
            vec![SeriesPoint::observed(date(2023, 1), 2)]
        );
        assert_eq!(trends.first_collision_date, Some(date(2023, 1)));
    }

    #[test]
    fn axis_is_global_and_vocabulary_is_local() {
        let crashes = sample();
        let a = build_category_time_series(&crashes, "SITE_A", &Dimension::CrashType, Granularity::Month);
        let b = build_category_time_series(&crashes, "SITE_B", &Dimension::CrashType, Granularity::Month);

        assert_eq!(a.axis, b.axis);
        assert_eq!(
            a.axis,
            vec![date(2022, 12), date(2023, 1), date(2023, 2), date(2023, 3)]
        );

        let keys = |t: &CategoryTimeSeries| t.series.iter().map(|s| s.key.clone()).collect::<Vec<_>>();
        assert_eq!(keys(&a), vec!["rear-end", "side"]);
        assert_eq!(keys(&b), vec!["pedestrian", "rear-end"]);
    }

    #[test]
    fn gaps_differ_from_observed_zero() {
        let trends = build_category_time_series(
            &sample(),
            "SITE_A",
            &Dimension::CrashType,
            Granularity::Month,
        );
        let rear_end = &trends.series[0];

        assert_eq!(rear_end.values[0], SeriesPoint::gap(date(2022, 12)));
        assert_eq!(rear_end.values[1], SeriesPoint::observed(date(2023, 1), 1));
        assert_eq!(rear_end.values[2], SeriesPoint::gap(date(2023, 2)));
        assert_eq!(rear_end.values[3], SeriesPoint::observed(date(2023, 3), 0));

        for series in &trends.series {
            for point in &series.values {
                assert_eq!(point.has_data, point.count.is_some());
            }
        }
        assert_eq!(trends.first_collision_date, Some(date(2023, 1)));
    }

    #[test]
    fn yearly_buckets_collapse_months() {
        let trends = build_category_time_series(
            &sample(),
            "SITE_A",
            &Dimension::CrashType,
            Granularity::Year,
        );
        assert_eq!(trends.axis, vec![date(2022, 1), date(2023, 1)]);
        let side = trends.series.iter().find(|s| s.key == "side").unwrap();
        assert_eq!(
            side.values,
            vec![SeriesPoint::gap(date(2022, 1)), SeriesPoint::observed(date(2023, 1), 1)]
        );
    }

    #[test]
    fn location_without_crashes_has_no_series() {
        let trends = build_category_time_series(
            &sample(),
            "SITE_Z",
            &Dimension::Outcome,
            Granularity::Month,
        );
        assert!(trends.series.is_empty());
        assert!(trends.first_collision_date.is_none());
        assert_eq!(trends.axis.len(), 4);
    }

    #[test]
    fn outcome_series_count_true_flags() {
        let crashes = vec![
            with_outcomes(crash("SITE_A", "side", 202_301), true, false),
            with_outcomes(crash("SITE_A", "side", 202_301), true, true),
            with_outcomes(crash("SITE_A", "side", 202_302), false, false),
        ];
        let trends =
            build_category_time_series(&crashes, "SITE_A", &Dimension::Outcome, Granularity::Month);

        let keys: Vec<&str> = trends.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["any_injury", "airbag_deployment", "suspected_serious_injury"]
        );

        let counts = |key: &str| -> Vec<Option<u64>> {
            trends
                .series
                .iter()
                .find(|s| s.key == key)
                .unwrap()
                .values
                .iter()
                .map(|p| p.count)
                .collect()
        };
        assert_eq!(counts("any_injury"), vec![Some(2), Some(0)]);
        assert_eq!(counts("airbag_deployment"), vec![Some(1), Some(0)]);
        assert_eq!(counts("suspected_serious_injury"), vec![Some(0), Some(0)]);
    }

    #[test]
    fn field_dimension_uses_column_values() {
        let mut wet = crash("SITE_A", "side", 202_301);
        wet.fields.insert("weather".to_owned(), "Rain".to_owned());
        let mut dry = crash("SITE_A", "side", 202_302);
        dry.fields.insert("weather".to_owned(), "Clear".to_owned());
        let unknown = crash("SITE_A", "side", 202_302);

        let dimension = Dimension::Field("weather".to_owned());
        let trends =
            build_category_time_series(&[wet, dry, unknown], "SITE_A", &dimension, Granularity::Month);

        let keys: Vec<&str> = trends.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Rain", "Clear"]);
        assert_eq!(
            trends.series[0].values,
            vec![
                SeriesPoint::observed(date(2023, 1), 1),
                SeriesPoint::observed(date(2023, 2), 0)
            ]
        );
    }

    #[test]
    fn outcome_column_as_field_dimension() {
        let mut injured = crash("SITE_A", "side", 202_301);
        injured.outcomes.any_injury = true;
        let unhurt = crash("SITE_A", "side", 202_301);

        let dimension = Dimension::Field("any_injury".to_owned());
        let trends =
            build_category_time_series(&[injured, unhurt], "SITE_A", &dimension, Granularity::Month);

        let keys: Vec<&str> = trends.series.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["True", "False"]);
        assert_eq!(trends.series[0].values, vec![SeriesPoint::observed(date(2023, 1), 1)]);
        assert_eq!(trends.series[1].values, vec![SeriesPoint::observed(date(2023, 1), 1)]);
    }

    #[test]
    fn undated_crashes_are_left_out() {
        let mut undated = crash("SITE_A", "side", 0);
        undated.year_month = None;
        let crashes = vec![undated, crash("SITE_B", "side", 202_301)];

        assert_eq!(time_axis(&crashes, Granularity::Month).len(), 1);
        let trends =
            build_category_time_series(&crashes, "SITE_A", &Dimension::CrashType, Granularity::Month);
        assert!(trends.series.is_empty());
        assert!(trends.first_collision_date.is_none());
    }
}
