//! Autoregressive rolling forecast
//!
//! Each step feeds the model's own previous output back in as input, so
//! forecast error compounds across the horizon. That is the expected
//! behavior of the rollout, not a defect; the decaying confidence score
//! exists to communicate it to callers.

use crate::error::{ForecastError, Result};
use crate::model::SequenceModel;
use crate::scaler::MinMaxScaler;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use stock_data::{CanonicalRecord, FEATURES};

/// Confidence assigned to the first forecast day.
pub const BASE_CONFIDENCE: f64 = 95.0;

/// Confidence lost per additional day out.
pub const CONFIDENCE_DECAY: f64 = 2.0;

/// Confidence never drops below this floor.
pub const CONFIDENCE_FLOOR: f64 = 85.0;

/// Index of the volume feature within a canonical row.
const VOLUME: usize = 4;

/// One forecast day.
///
/// `confidence` is a deterministic decay heuristic over the day index — a
/// design simplification kept for output compatibility, not a calibrated
/// probability derived from model uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    /// 1-based day index into the future.
    pub day: usize,
    /// Relative label for the forecast day ("T+1", "T+2", ...).
    pub date: String,
    pub predicted_open: f64,
    pub predicted_high: f64,
    pub predicted_low: f64,
    pub predicted_close: f64,
    pub confidence: f64,
}

/// Roll the model forward `horizon` days from the last real window.
///
/// `recent` must hold the most recent `window` rows of real data in date
/// order. Volume is never forecast: the last known volume is carried forward
/// unchanged through every synthetic row. The window slides strictly FIFO,
/// keeping its length constant across the whole rollout.
pub fn roll_forward(
    model: &dyn SequenceModel,
    scaler: &MinMaxScaler,
    recent: &[CanonicalRecord],
    horizon: usize,
) -> Result<Vec<ForecastStep>> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon);
    }
    if recent.is_empty() {
        return Err(ForecastError::InsufficientData {
            required: 1,
            found: 0,
        });
    }

    let width = recent.len();
    let mut window = scaler.transform(recent);
    let mut steps = Vec::with_capacity(horizon);

    for day in 1..=horizon {
        let predicted = model.predict(&window)?;

        // Rebuild a full feature row: predicted OHLC plus the carried volume.
        let mut row = [0.0_f64; FEATURES];
        for j in 0..4 {
            row[j] = predicted[j];
        }
        row[VOLUME] = window[[width - 1, VOLUME]];

        let denormalized = scaler.inverse_row(&row);
        let confidence =
            (BASE_CONFIDENCE - CONFIDENCE_DECAY * (day as f64 - 1.0)).max(CONFIDENCE_FLOOR);

        steps.push(ForecastStep {
            day,
            date: format!("T+{day}"),
            predicted_open: round2(denormalized[0]),
            predicted_high: round2(denormalized[1]),
            predicted_low: round2(denormalized[2]),
            predicted_close: round2(denormalized[3]),
            confidence,
        });

        // FIFO slide: drop the oldest row, append the synthetic one.
        let mut next = Array2::zeros((width, FEATURES));
        next.slice_mut(s![..width - 1, ..])
            .assign(&window.slice(s![1.., ..]));
        for (j, value) in row.iter().enumerate() {
            next[[width - 1, j]] = *value;
        }
        window = next;
    }

    Ok(steps)
}

/// Round to two decimal places for human-scale price output.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
