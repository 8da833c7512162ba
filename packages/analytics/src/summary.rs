//! Collisions against miles, per location.

use std::collections::{BTreeMap, BTreeSet};

use av_story_analytics_models::LocationSummary;
use av_story_dataset_models::{CrashRecord, MileageRecord};

/// Summarizes every mileage location with its crash count and
/// collisions-per-million-miles ratio.
///
/// Output follows mileage table order. Locations are matched by exact,
/// case-sensitive string equality; crashes at locations absent from the
/// mileage table are not reported. A location with zero miles gets a
/// non-finite ratio rather than being dropped.
#[must_use]
pub fn summarize_by_location(
    mileage: &[MileageRecord],
    crashes: &[CrashRecord],
) -> Vec<LocationSummary> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for crash in crashes {
        *counts.entry(crash.location.as_str()).or_default() += 1;
    }

    mileage
        .iter()
        .map(|m| {
            let collisions = counts.get(m.location.as_str()).copied().unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let ratio = collisions as f64 / m.miles_millions;
            LocationSummary {
                location: m.location.clone(),
                miles: m.miles_millions,
                collisions,
                ratio,
            }
        })
        .collect()
}

/// Every location in either table: mileage table order first, then
/// crash-only locations in first-seen order. Empty identifiers are skipped.
#[must_use]
pub fn distinct_locations(mileage: &[MileageRecord], crashes: &[CrashRecord]) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    mileage
        .iter()
        .map(|m| m.location.as_str())
        .chain(crashes.iter().map(|c| c.location.as_str()))
        .filter(|location| !location.is_empty() && seen.insert(*location))
        .map(str::to_owned)
        .collect()
}
