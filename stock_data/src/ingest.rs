//! CSV decoding into validated datasets

use crate::columns::ColumnMap;
use crate::error::{DataError, Result};
use crate::record::{CanonicalRecord, Dataset};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

/// Date-only formats tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Datetime formats tried when no date-only format matches.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

impl Dataset {
    /// Decode an uploaded CSV payload into a validated dataset.
    ///
    /// Headers are matched through [`ColumnMap::resolve`]. Rows whose numeric
    /// cells fail to parse (or are non-finite) are dropped rather than
    /// rejecting the upload; a date cell that no supported format can parse
    /// rejects the whole upload, since a broken date column poisons the
    /// ordering of everything after it.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let map = ColumnMap::resolve(&headers)?;

        let mut records = Vec::new();
        let mut saw_row = false;
        for row in reader.records() {
            let row = row?;
            saw_row = true;

            let date_cell = row.get(map.date).unwrap_or("").trim();
            if date_cell.is_empty() {
                // Ragged or blank row: drop it like any other unusable cell.
                continue;
            }
            let date = parse_date(date_cell)?;

            let cells = [
                row.get(map.open),
                row.get(map.high),
                row.get(map.low),
                row.get(map.close),
                row.get(map.volume),
            ];
            let mut values = [0.0_f64; 5];
            let mut clean = true;
            for (slot, cell) in cells.iter().enumerate() {
                match cell.and_then(parse_numeric) {
                    Some(v) => values[slot] = v,
                    None => {
                        clean = false;
                        break;
                    }
                }
            }
            if !clean {
                continue;
            }

            records.push(CanonicalRecord {
                date,
                open: values[0],
                high: values[1],
                low: values[2],
                close: values[3],
                volume: values[4],
            });
        }

        if !saw_row {
            return Err(DataError::EmptyFile);
        }

        Dataset::from_records(records)
    }

    /// Convenience wrapper reading the CSV from disk.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(&bytes)
    }
}

/// Parse a date cell, trying date-only formats first, then datetimes.
fn parse_date(cell: &str) -> Result<NaiveDate> {
    let cell = cell.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Ok(dt.date());
        }
    }
    Err(DataError::InvalidDate {
        value: cell.to_string(),
    })
}

/// Coerce a numeric cell, returning `None` for anything unusable.
fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
