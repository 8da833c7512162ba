//! CSV decoding for both tables.
//!
//! Rows are read into column-name maps (headers trimmed, cells trimmed) and
//! then normalized by the record constructors in
//! [`av_story_dataset_models`].

use av_story_dataset_models::{
    CRASH_TYPE_COLUMN, CrashRecord, LOCATION_COLUMN, MILES_COLUMN, MILES_COLUMN_ALIAS,
    MileageRecord, OutcomeKind, RawRow, YEAR_MONTH_COLUMN,
};

use crate::FetchError;

/// A decoded CSV table before normalization.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Trimmed header names, in file order.
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// Fails with [`FetchError::Missing`] when `column` is not in the header.
    fn require_column(&self, column: &str) -> Result<(), FetchError> {
        if self.headers.iter().any(|h| h == column) {
            Ok(())
        } else {
            Err(FetchError::Missing(format!(
                "missing required column '{column}'"
            )))
        }
    }

    /// Fails with [`FetchError::Missing`] when none of `columns` is present.
    fn require_one_of(&self, columns: &[&str]) -> Result<(), FetchError> {
        if columns.iter().any(|c| self.headers.iter().any(|h| h == c)) {
            Ok(())
        } else {
            Err(FetchError::Missing(format!(
                "missing required column, expected one of {}",
                columns.join(", ")
            )))
        }
    }
}

/// Parses CSV text into raw rows keyed by header.
///
/// # Errors
///
/// Returns [`FetchError::Csv`] if the text is not valid CSV, or
/// [`FetchError::Missing`] if it has no header row.
pub fn read_table(text: &str) -> Result<RawTable, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(FetchError::Missing(
            "CSV file contains no header row".to_owned(),
        ));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row: RawRow = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").trim().to_owned()))
            .collect();
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}

/// Decodes the mileage table.
///
/// # Errors
///
/// Returns [`FetchError`] if the CSV is malformed, or lacks the `location`
/// column or a miles column (`miles_millions` or `miles`). Blank or
/// unparseable miles cells still default to zero.
pub fn decode_mileage(text: &str) -> Result<Vec<MileageRecord>, FetchError> {
    let table = read_table(text)?;
    table.require_column(LOCATION_COLUMN)?;
    table.require_one_of(&[MILES_COLUMN, MILES_COLUMN_ALIAS])?;

    let mut skipped = 0_usize;
    let records: Vec<MileageRecord> = table
        .rows
        .iter()
        .filter_map(|row| {
            let record = MileageRecord::from_row(row);
            if record.is_none() {
                skipped += 1;
            }
            record
        })
        .collect();

    if skipped > 0 {
        log::warn!("Skipped {skipped} mileage rows without a location");
    }

    Ok(records)
}

/// Decodes the crash table.
///
/// # Errors
///
/// Returns [`FetchError`] if the CSV is malformed or lacks any of the
/// `location`, `year_month`, `crash_type` or outcome columns. Blank cells in
/// those columns are tolerated and default per record.
pub fn decode_crashes(text: &str) -> Result<Vec<CrashRecord>, FetchError> {
    let table = read_table(text)?;
    for column in [LOCATION_COLUMN, YEAR_MONTH_COLUMN, CRASH_TYPE_COLUMN] {
        table.require_column(column)?;
    }
    for kind in OutcomeKind::all() {
        table.require_column(kind.as_ref())?;
    }

    let records: Vec<CrashRecord> = table
        .rows
        .into_iter()
        .map(CrashRecord::from_row)
        .collect();

    let undated = records.iter().filter(|c| c.year_month.is_none()).count();
    if undated > 0 {
        log::warn!("{undated} crash rows have no valid year_month and are left out of trends");
    }

    Ok(records)
}
