#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mileage and crash record types for the autonomous-vehicle story.
//!
//! Both source tables are decoded into loosely typed rows (column name to
//! raw string) by the loader and normalized here, exactly once, into the
//! strict record types the aggregation layer works with. Outcome flags that
//! arrive as `"True"`/`"False"` strings become real booleans, and missing
//! numeric values default to zero.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Column holding the location identifier in both tables.
pub const LOCATION_COLUMN: &str = "location";
/// Column holding mileage (in millions of miles).
pub const MILES_COLUMN: &str = "miles_millions";
/// Older exports name the mileage column plainly.
pub const MILES_COLUMN_ALIAS: &str = "miles";
/// Column holding the `YYYYMM` encoded incident month.
pub const YEAR_MONTH_COLUMN: &str = "year_month";
/// Column holding the crash type.
pub const CRASH_TYPE_COLUMN: &str = "crash_type";

/// A raw decoded row: column header to trimmed cell text.
pub type RawRow = BTreeMap<String, String>;

/// Outcome indicators recorded for every crash.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OutcomeKind {
    /// Any injury was reported.
    AnyInjury,
    /// At least one airbag deployed.
    AirbagDeployment,
    /// A suspected serious injury was reported.
    SuspectedSeriousInjury,
}

impl OutcomeKind {
    /// Returns all variants in column order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AnyInjury,
            Self::AirbagDeployment,
            Self::SuspectedSeriousInjury,
        ]
    }
}

/// A calendar month decoded from the `YYYYMM` integer encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a year-month, returning `None` when the month is outside
    /// `1..=12`.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Decodes a `YYYYMM` integer (e.g. `202301`).
    #[must_use]
    pub fn from_encoded(encoded: u32) -> Option<Self> {
        let year = i32::try_from(encoded / 100).ok()?;
        Self::new(year, encoded % 100)
    }

    /// Returns the `YYYYMM` encoding.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn encoded(self) -> u32 {
        self.year as u32 * 100 + self.month
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// First day of this month.
    #[must_use]
    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl From<YearMonth> for u32 {
    fn from(value: YearMonth) -> Self {
        value.encoded()
    }
}

impl TryFrom<u32> for YearMonth {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_encoded(value).ok_or_else(|| format!("invalid YYYYMM value {value}"))
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Miles driven at one operating location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MileageRecord {
    /// Operating site identifier (e.g. `"SAN_FRANCISCO"`).
    pub location: String,
    /// Miles driven, in millions. Never negative.
    pub miles_millions: f64,
}

impl MileageRecord {
    /// Normalizes a raw mileage row.
    ///
    /// Returns `None` when the row has no location. Missing or unparseable
    /// miles default to zero.
    #[must_use]
    pub fn from_row(row: &RawRow) -> Option<Self> {
        let location = row.get(LOCATION_COLUMN).map(String::as_str).unwrap_or("");
        if location.is_empty() {
            return None;
        }

        let miles = row
            .get(MILES_COLUMN)
            .or_else(|| row.get(MILES_COLUMN_ALIAS))
            .map_or(0.0, |s| parse_miles(s));

        Some(Self {
            location: location.to_owned(),
            miles_millions: miles,
        })
    }
}

/// Outcome indicators of a single crash, normalized to strict booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeFlags {
    pub any_injury: bool,
    pub airbag_deployment: bool,
    pub suspected_serious_injury: bool,
}

impl OutcomeFlags {
    /// Returns the flag for the given outcome.
    #[must_use]
    pub const fn get(&self, kind: OutcomeKind) -> bool {
        match kind {
            OutcomeKind::AnyInjury => self.any_injury,
            OutcomeKind::AirbagDeployment => self.airbag_deployment,
            OutcomeKind::SuspectedSeriousInjury => self.suspected_serious_injury,
        }
    }

    const fn set(&mut self, kind: OutcomeKind, value: bool) {
        match kind {
            OutcomeKind::AnyInjury => self.any_injury = value,
            OutcomeKind::AirbagDeployment => self.airbag_deployment = value,
            OutcomeKind::SuspectedSeriousInjury => self.suspected_serious_injury = value,
        }
    }
}

/// One reported incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashRecord {
    /// Location identifier, matched against [`MileageRecord::location`]
    /// by exact string equality.
    pub location: String,
    /// Crash type category. Empty when the source left it blank.
    pub crash_type: String,
    /// Incident month. `None` when the source value was missing or invalid.
    pub year_month: Option<YearMonth>,
    pub outcomes: OutcomeFlags,
    /// Every other source column, kept verbatim for field dimensions.
    pub fields: BTreeMap<String, String>,
}

impl CrashRecord {
    /// Normalizes a raw crash row. Never fails: absent values default.
    #[must_use]
    pub fn from_row(mut row: RawRow) -> Self {
        let location = row.remove(LOCATION_COLUMN).unwrap_or_default();
        let crash_type = row.remove(CRASH_TYPE_COLUMN).unwrap_or_default();
        let year_month = row
            .remove(YEAR_MONTH_COLUMN)
            .and_then(|s| parse_year_month(&s));

        let mut outcomes = OutcomeFlags::default();
        for kind in OutcomeKind::all() {
            let value = row.remove(kind.as_ref()).is_some_and(|s| parse_flag(&s));
            outcomes.set(*kind, value);
        }

        Self {
            location,
            crash_type,
            year_month,
            outcomes,
            fields: row,
        }
    }

    /// Looks up a categorical field by column name.
    ///
    /// The well-known columns resolve to their typed values, with outcome
    /// columns reading `"True"` or `"False"`; anything else is read from
    /// [`CrashRecord::fields`]. Empty values count as absent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            LOCATION_COLUMN => self.location.as_str(),
            CRASH_TYPE_COLUMN => self.crash_type.as_str(),
            other => match other.parse::<OutcomeKind>() {
                Ok(kind) if self.outcomes.get(kind) => "True",
                Ok(_) => "False",
                Err(_) => self.fields.get(other)?.as_str(),
            },
        };
        (!value.is_empty()).then_some(value)
    }
}

/// Both source tables, as loaded for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datasets {
    pub mileage: Vec<MileageRecord>,
    pub crashes: Vec<CrashRecord>,
}

impl Datasets {
    /// Names of the extra crash columns present in any row, sorted.
    #[must_use]
    pub fn crash_field_names(&self) -> Vec<String> {
        self.crashes
            .iter()
            .flat_map(|c| c.fields.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Location identifiers in mileage table order.
    #[must_use]
    pub fn locations(&self) -> Vec<&str> {
        self.mileage.iter().map(|m| m.location.as_str()).collect()
    }
}

/// Parses an outcome flag. `true` (any case) and `1` are truthy; everything
/// else, including an empty cell, is false.
#[must_use]
pub fn parse_flag(s: &str) -> bool {
    let s = s.trim();
    s.eq_ignore_ascii_case("true") || s == "1"
}

/// Parses a mileage value, defaulting to zero and clamping negatives.
#[must_use]
pub fn parse_miles(s: &str) -> f64 {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v,
        Ok(_) => 0.0,
        Err(_) => {
            if !s.trim().is_empty() {
                log::warn!("Unparseable mileage value '{s}', defaulting to 0");
            }
            0.0
        }
    }
}

/// Parses a `YYYYMM` cell. Accepts float renderings such as `"202301.0"`.
#[must_use]
pub fn parse_year_month(s: &str) -> Option<YearMonth> {
    let s = s.trim();
    let encoded = s.parse::<u32>().ok().or_else(|| float_to_u32(s.parse::<f64>().ok()?))?;
    YearMonth::from_encoded(encoded)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u32(v: f64) -> Option<u32> {
    (v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
}
