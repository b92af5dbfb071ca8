//! Trainable sequence models
//!
//! The training runtime is deliberately narrow: anything that can fit on
//! `(window, target)` pairs and predict a normalized OHLC row can drive the
//! rolling forecast, which keeps the windowing and forecasting logic testable
//! against a deterministic stub.

use crate::error::Result;
use crate::window::{DEFAULT_WINDOW, TARGETS};
use ndarray::{Array1, Array2, Array3};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod recurrent;

pub use recurrent::RecurrentRegressor;

/// Architecture and hyperparameters handed to the model collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Lookback window length in rows.
    pub window: usize,
    /// Widths of the two stacked recurrent layers.
    pub recurrent_widths: [usize; 2],
    /// Dropout rate applied during training.
    pub dropout: f64,
    /// Width of the dense hidden layer.
    pub dense_width: usize,
    /// Number of predicted values (open, high, low, close).
    pub outputs: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Seed for weight initialization and dropout masks.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            recurrent_widths: [64, 32],
            dropout: 0.2,
            dense_width: 16,
            outputs: TARGETS,
            epochs: 50,
            batch_size: 32,
            learning_rate: 0.001,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    /// Human-readable rendering of the layer stack.
    pub fn architecture_summary(&self) -> String {
        format!(
            "Recurrent({}) -> Dropout({}) -> Recurrent({}) -> Dropout({}) -> Dense({}, relu) -> Dense({}, linear)",
            self.recurrent_widths[0],
            self.dropout,
            self.recurrent_widths[1],
            self.dropout,
            self.dense_width,
            self.outputs,
        )
    }
}

/// Per-epoch training and validation loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub loss: Vec<f64>,
    pub val_loss: Vec<f64>,
}

/// A model that learns from windowed sequences and predicts the next OHLC row.
pub trait SequenceModel {
    /// Fit on `[n, window, features]` inputs and `[n, outputs]` targets,
    /// reporting per-epoch losses against the held-out validation split.
    fn fit(
        &mut self,
        train_x: &Array3<f64>,
        train_y: &Array2<f64>,
        val_x: &Array3<f64>,
        val_y: &Array2<f64>,
    ) -> Result<TrainingHistory>;

    /// Predict the normalized OHLC row following a single `[window, features]`
    /// sequence.
    fn predict(&self, window: &Array2<f64>) -> Result<Array1<f64>>;

    /// Predict one OHLC row per window in a `[n, window, features]` batch.
    fn predict_batch(&self, inputs: &Array3<f64>) -> Result<Array2<f64>>;

    /// Persist the model weights to disk.
    fn save(&self, path: &Path) -> Result<()>;
}
