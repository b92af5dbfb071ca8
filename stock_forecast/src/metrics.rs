//! Metrics for evaluating forecast performance
//!
//! All functions compare an actual and a predicted `[n, 4]` OHLC matrix from
//! the validation split. Mismatched shapes or empty inputs yield NaN rather
//! than panicking.

use ndarray::Array2;

/// Column index of the open price within a target row.
pub const OPEN: usize = 0;

/// Column index of the close price within a target row.
pub const CLOSE: usize = 3;

/// Mean squared error over all cells.
pub fn mean_squared_error(actual: &Array2<f64>, predicted: &Array2<f64>) -> f64 {
    if actual.shape() != predicted.shape() || actual.is_empty() {
        return f64::NAN;
    }
    (actual - predicted).mapv(|d| d * d).mean().unwrap_or(f64::NAN)
}

/// Mean absolute error over all cells.
pub fn mean_absolute_error(actual: &Array2<f64>, predicted: &Array2<f64>) -> f64 {
    if actual.shape() != predicted.shape() || actual.is_empty() {
        return f64::NAN;
    }
    (actual - predicted).mapv(f64::abs).mean().unwrap_or(f64::NAN)
}

/// Root mean squared error over all cells.
pub fn root_mean_squared_error(actual: &Array2<f64>, predicted: &Array2<f64>) -> f64 {
    mean_squared_error(actual, predicted).sqrt()
}

/// Coefficient of determination over all cells.
///
/// A constant actual matrix (zero total variance) yields 0.0.
pub fn r_squared(actual: &Array2<f64>, predicted: &Array2<f64>) -> f64 {
    if actual.shape() != predicted.shape() || actual.is_empty() {
        return f64::NAN;
    }
    let mean = actual.mean().unwrap_or(0.0);
    let ss_tot = actual.mapv(|a| (a - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return 0.0;
    }
    let ss_res = (actual - predicted).mapv(|d| d.powi(2)).sum();
    1.0 - ss_res / ss_tot
}

/// Percentage of rows where the predicted close-vs-open direction matches the
/// actual direction. Always within [0, 100] for non-empty input.
pub fn directional_accuracy(actual: &Array2<f64>, predicted: &Array2<f64>) -> f64 {
    if actual.shape() != predicted.shape() || actual.nrows() == 0 || actual.ncols() <= CLOSE {
        return f64::NAN;
    }
    let correct = (0..actual.nrows())
        .filter(|&i| {
            sign(actual[[i, CLOSE]] - actual[[i, OPEN]])
                == sign(predicted[[i, CLOSE]] - predicted[[i, OPEN]])
        })
        .count();
    correct as f64 / actual.nrows() as f64 * 100.0
}

/// Three-valued sign: flat days compare equal only to flat predictions.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
