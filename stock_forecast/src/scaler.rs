//! Feature-wise min-max normalization
//!
//! The scaler is fitted once per training run over the full canonical table
//! and is immutable afterwards. Its parameters are persisted as JSON next to
//! the model weights so forecasts after a restart denormalize identically.

use crate::error::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use stock_data::{CanonicalRecord, FEATURES};

/// Per-feature min-max scaler mapping values into [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: [f64; FEATURES],
    max: [f64; FEATURES],
}

impl MinMaxScaler {
    /// Fit per-feature minima and maxima over the whole table.
    pub fn fit(records: &[CanonicalRecord]) -> Self {
        let mut min = [f64::INFINITY; FEATURES];
        let mut max = [f64::NEG_INFINITY; FEATURES];
        for record in records {
            for (j, value) in record.features().iter().enumerate() {
                min[j] = min[j].min(*value);
                max[j] = max[j].max(*value);
            }
        }
        Self { min, max }
    }

    /// Scale a single value of the given feature.
    ///
    /// A degenerate feature (max == min) scales to 0.0 rather than NaN.
    pub fn scale_value(&self, value: f64, feature: usize) -> f64 {
        let range = self.max[feature] - self.min[feature];
        if range == 0.0 {
            0.0
        } else {
            (value - self.min[feature]) / range
        }
    }

    /// Map a scaled value of the given feature back to its original range.
    ///
    /// A degenerate feature inverts to its (single) observed value.
    pub fn unscale_value(&self, scaled: f64, feature: usize) -> f64 {
        let range = self.max[feature] - self.min[feature];
        if range == 0.0 {
            self.min[feature]
        } else {
            scaled * range + self.min[feature]
        }
    }

    /// Scale a table of records into an `[n_rows, FEATURES]` matrix.
    pub fn transform(&self, records: &[CanonicalRecord]) -> Array2<f64> {
        let mut out = Array2::zeros((records.len(), FEATURES));
        for (i, record) in records.iter().enumerate() {
            for (j, value) in record.features().iter().enumerate() {
                out[[i, j]] = self.scale_value(*value, j);
            }
        }
        out
    }

    /// Denormalize one full feature row.
    pub fn inverse_row(&self, scaled: &[f64; FEATURES]) -> [f64; FEATURES] {
        let mut out = [0.0; FEATURES];
        for (j, value) in scaled.iter().enumerate() {
            out[j] = self.unscale_value(*value, j);
        }
        out
    }

    /// Persist the fitted parameters as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Restore previously persisted parameters.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use chrono::NaiveDate;

    fn record(day: u32, open: f64, volume: f64) -> CanonicalRecord {
        CanonicalRecord {
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Days::new(day as u64),
            open,
            high: open + 2.0,
            low: open - 1.0,
            close: open + 1.0,
            volume,
        }
    }

    #[test]
    fn test_scaling_range() {
        let records = vec![
            record(0, 100.0, 1_000.0),
            record(1, 150.0, 2_000.0),
            record(2, 200.0, 3_000.0),
        ];
        let scaler = MinMaxScaler::fit(&records);
        let scaled = scaler.transform(&records);

        assert_eq!(scaled.nrows(), 3);
        assert_approx_eq!(scaled[[0, 0]], 0.0);
        assert_approx_eq!(scaled[[1, 0]], 0.5);
        assert_approx_eq!(scaled[[2, 0]], 1.0);
        assert_approx_eq!(scaled[[1, 4]], 0.5);
    }

    #[test]
    fn test_round_trip() {
        let records = vec![
            record(0, 103.2, 1_234.0),
            record(1, 98.7, 4_321.0),
            record(2, 140.05, 2_500.0),
        ];
        let scaler = MinMaxScaler::fit(&records);

        for record in &records {
            for (j, value) in record.features().iter().enumerate() {
                let scaled = scaler.scale_value(*value, j);
                assert_approx_eq!(scaler.unscale_value(scaled, j), *value, 1e-9);
            }
        }
    }

    #[test]
    fn test_degenerate_feature_scales_to_zero() {
        // Constant volume across the table.
        let records = vec![
            record(0, 100.0, 5_000.0),
            record(1, 110.0, 5_000.0),
            record(2, 120.0, 5_000.0),
        ];
        let scaler = MinMaxScaler::fit(&records);

        let scaled = scaler.transform(&records);
        for i in 0..3 {
            assert_eq!(scaled[[i, 4]], 0.0);
            assert!(!scaled[[i, 4]].is_nan());
        }
        // Degenerate inversion returns the single observed value.
        assert_approx_eq!(scaler.unscale_value(0.0, 4), 5_000.0);
    }

    #[test]
    fn test_json_round_trip() {
        let records = vec![record(0, 100.0, 1_000.0), record(1, 200.0, 2_000.0)];
        let scaler = MinMaxScaler::fit(&records);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        scaler.save_json(&path).unwrap();
        let restored = MinMaxScaler::load_json(&path).unwrap();

        assert_eq!(scaler, restored);
    }
}
