//! Collisions by crash type, flat or stacked by location.
//!
//! The crash-type vocabulary always comes from the full table so that a
//! narrow filter still shows every category (as zero-count bars), keeping
//! the chart stable while the user toggles locations.

use std::collections::{BTreeMap, BTreeSet};

use av_story_analytics_models::{
    CrashTypeCount, LocationCount, Selection, StackedCrashTypeRow,
};
use av_story_dataset_models::CrashRecord;

/// Distinct crash types across the whole table, in first-seen order.
#[must_use]
pub fn crash_type_vocabulary(crashes: &[CrashRecord]) -> Vec<&str> {
    let mut vocabulary: Vec<&str> = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for crash in crashes {
        if seen.insert(crash.crash_type.as_str()) {
            vocabulary.push(crash.crash_type.as_str());
        }
    }
    vocabulary
}

/// Counts crashes per type within `selection`, pooled across locations.
///
/// Output has one entry per crash type in the full table, ordered by
/// descending count with ties kept in first-seen order.
#[must_use]
pub fn count_by_crash_type(crashes: &[CrashRecord], selection: &Selection) -> Vec<CrashTypeCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for crash in crashes.iter().filter(|c| selection.contains(&c.location)) {
        *counts.entry(crash.crash_type.as_str()).or_default() += 1;
    }

    let mut result: Vec<CrashTypeCount> = crash_type_vocabulary(crashes)
        .into_iter()
        .map(|crash_type| CrashTypeCount {
            crash_type: crash_type.to_owned(),
            count: counts.get(crash_type).copied().unwrap_or(0),
        })
        .collect();

    // `sort_by` is stable, which keeps first-seen order among ties.
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Counts crashes per type, broken down by each of `locations`.
///
/// Same vocabulary and ordering rules as [`count_by_crash_type`], ordered by
/// the row total. Each row lists the locations in the order given.
#[must_use]
pub fn stack_by_location(crashes: &[CrashRecord], locations: &[String]) -> Vec<StackedCrashTypeRow> {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for crash in crashes.iter().filter(|c| locations.contains(&c.location)) {
        *counts
            .entry((crash.crash_type.as_str(), crash.location.as_str()))
            .or_default() += 1;
    }

    let mut rows: Vec<StackedCrashTypeRow> = crash_type_vocabulary(crashes)
        .into_iter()
        .map(|crash_type| {
            let by_location: Vec<LocationCount> = locations
                .iter()
                .map(|location| LocationCount {
                    location: location.clone(),
                    count: counts
                        .get(&(crash_type, location.as_str()))
                        .copied()
                        .unwrap_or(0),
                })
                .collect();
            StackedCrashTypeRow {
                crash_type: crash_type.to_owned(),
                total: by_location.iter().map(|l| l.count).sum(),
                by_location,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}
