//! Sequence windowing for model training
//!
//! Turns a scaled feature matrix into fixed-length input windows paired with
//! the OHLC row that immediately follows each window.

use crate::error::{ForecastError, Result};
use ndarray::{s, Array2, Array3};

/// Default lookback window length in trading days.
pub const DEFAULT_WINDOW: usize = 60;

/// Number of predicted values per window (open, high, low, close).
pub const TARGETS: usize = 4;

/// Build `(window, target)` pairs from a scaled `[rows, features]` matrix.
///
/// For a table of `L` rows and window length `W` this produces exactly
/// `L - W` pairs: window *i* holds rows `[i, i + W)` and target *i* is the
/// OHLC slice of row `i + W`. Requires `L >= W + 1`.
pub fn build_sequences(scaled: &Array2<f64>, window: usize) -> Result<(Array3<f64>, Array2<f64>)> {
    if window == 0 {
        return Err(ForecastError::InvalidParameter(
            "window length must be positive".to_string(),
        ));
    }
    let rows = scaled.nrows();
    if rows < window + 1 {
        return Err(ForecastError::InsufficientData {
            required: window + 1,
            found: rows,
        });
    }

    let features = scaled.ncols();
    let count = rows - window;
    let mut inputs = Array3::zeros((count, window, features));
    let mut targets = Array2::zeros((count, TARGETS));

    for i in 0..count {
        inputs
            .slice_mut(s![i, .., ..])
            .assign(&scaled.slice(s![i..i + window, ..]));
        targets
            .slice_mut(s![i, ..])
            .assign(&scaled.slice(s![i + window, ..TARGETS]));
    }

    Ok((inputs, targets))
}

/// Split windows into train and validation partitions in temporal order.
///
/// The first `train_ratio` share of windows trains, the rest validates.
/// Shuffling is deliberately absent: it would leak future rows into the
/// training partition.
pub fn temporal_split(
    inputs: &Array3<f64>,
    targets: &Array2<f64>,
    train_ratio: f64,
) -> (Array3<f64>, Array2<f64>, Array3<f64>, Array2<f64>) {
    let count = inputs.shape()[0];
    let split = (count as f64 * train_ratio).floor() as usize;

    (
        inputs.slice(s![..split, .., ..]).to_owned(),
        targets.slice(s![..split, ..]).to_owned(),
        inputs.slice(s![split.., .., ..]).to_owned(),
        targets.slice(s![split.., ..]).to_owned(),
    )
}
