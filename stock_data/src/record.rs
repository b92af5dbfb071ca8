//! Canonical OHLCV records and the validated dataset built from them

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of features carried per record (open, high, low, close, volume).
pub const FEATURES: usize = 5;

/// Minimum number of valid rows a dataset must contain.
pub const MIN_RECORDS: usize = 100;

/// One day of OHLCV data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl CanonicalRecord {
    /// The record's feature vector in canonical order.
    pub fn features(&self) -> [f64; FEATURES] {
        [self.open, self.high, self.low, self.close, self.volume]
    }

    /// Whether the record survives cleaning: finite positive prices and a
    /// finite non-negative volume.
    pub fn is_clean(&self) -> bool {
        let prices_ok = [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0);
        prices_ok && self.volume.is_finite() && self.volume >= 0.0
    }
}

/// A validated, date-ascending collection of [`CanonicalRecord`]s.
///
/// Construction enforces the dataset invariants: records are sorted by date,
/// duplicate dates collapse to the first occurrence, rows failing
/// [`CanonicalRecord::is_clean`] are dropped, and at least [`MIN_RECORDS`]
/// rows must survive. Once built, a dataset is immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<CanonicalRecord>,
}

/// Date range covered by a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Aggregate price statistics reported after a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub avg_open: f64,
    pub avg_close: f64,
    pub max_price: f64,
    pub min_price: f64,
    /// Spread between the highest high and the lowest low over the table.
    pub volatility: f64,
}

/// Summary returned to the caller after ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub date_range: DateRange,
    pub price_stats: PriceStats,
}

impl Dataset {
    /// Build a dataset from raw records, applying cleaning and ordering.
    pub fn from_records(mut records: Vec<CanonicalRecord>) -> Result<Self> {
        records.retain(CanonicalRecord::is_clean);
        // Stable sort, then keep the first occurrence of each date.
        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);

        if records.len() < MIN_RECORDS {
            return Err(DataError::InsufficientRows {
                found: records.len(),
                required: MIN_RECORDS,
            });
        }

        Ok(Self { records })
    }

    /// All records in date-ascending order.
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// The last `n` records (fewer when the dataset is shorter).
    pub fn last_n(&self, n: usize) -> &[CanonicalRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate statistics over the whole table.
    pub fn summary(&self) -> DatasetSummary {
        let n = self.records.len() as f64;
        let avg_open = self.records.iter().map(|r| r.open).sum::<f64>() / n;
        let avg_close = self.records.iter().map(|r| r.close).sum::<f64>() / n;
        let max_price = self.records.iter().map(|r| r.high).fold(f64::MIN, f64::max);
        let min_price = self.records.iter().map(|r| r.low).fold(f64::MAX, f64::min);

        DatasetSummary {
            total_records: self.records.len(),
            date_range: DateRange {
                start: self.records[0].date,
                end: self.records[self.records.len() - 1].date,
            },
            price_stats: PriceStats {
                avg_open,
                avg_close,
                max_price,
                min_price,
                volatility: max_price - min_price,
            },
        }
    }
}
