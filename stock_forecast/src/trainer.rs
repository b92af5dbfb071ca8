//! Training orchestration
//!
//! Drives one full training run: fit the scaler, window the scaled table,
//! split temporally, delegate to the model collaborator and evaluate on the
//! held-out validation windows. Nothing observable is mutated on failure;
//! the caller installs the returned model and scaler only on success.

use crate::error::{ForecastError, Result};
use crate::metrics;
use crate::model::{RecurrentRegressor, SequenceModel, TrainingConfig, TrainingHistory};
use crate::scaler::MinMaxScaler;
use crate::window::{build_sequences, temporal_split};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use stock_data::Dataset;

/// Share of windows used for training; the remainder validates.
pub const TRAIN_RATIO: f64 = 0.8;

/// File name of the persisted model weights.
pub const MODEL_FILE: &str = "recurrent_model.bin";

/// File name of the persisted scaler parameters.
pub const SCALER_FILE: &str = "scaler.json";

/// Hyperparameters echoed back to the caller after training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    pub model_type: String,
    pub layers: Vec<usize>,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub sequence_length: usize,
}

impl From<&TrainingConfig> for Hyperparameters {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            model_type: "Recurrent".to_string(),
            layers: config.recurrent_widths.to_vec(),
            epochs: config.epochs,
            batch_size: config.batch_size,
            learning_rate: config.learning_rate,
            sequence_length: config.window,
        }
    }
}

/// Validation metrics for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub mse: f64,
    pub mae: f64,
    pub rmse: f64,
    pub r2_score: f64,
    /// Percentage of validation rows with the correct close-vs-open direction.
    pub directional_accuracy: f64,
    /// Wall-clock training time in seconds.
    pub training_time: f64,
}

/// Everything a caller needs to report about a completed training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub architecture: String,
    pub hyperparameters: Hyperparameters,
    pub metrics: EvaluationMetrics,
    pub history: TrainingHistory,
}

/// Run one training pass over the dataset.
///
/// Returns the fitted model, the fitted scaler and the evaluation report.
/// The dataset must yield at least two windows so the temporal split leaves
/// both partitions non-empty.
pub fn train_model(
    dataset: &Dataset,
    config: &TrainingConfig,
) -> Result<(RecurrentRegressor, MinMaxScaler, TrainingOutcome)> {
    let started = Instant::now();

    let scaler = MinMaxScaler::fit(dataset.records());
    let scaled = scaler.transform(dataset.records());
    let (inputs, targets) = build_sequences(&scaled, config.window)?;

    let (train_x, train_y, val_x, val_y) = temporal_split(&inputs, &targets, TRAIN_RATIO);
    if train_x.shape()[0] == 0 || val_x.shape()[0] == 0 {
        return Err(ForecastError::InsufficientData {
            required: config.window + 2,
            found: dataset.len(),
        });
    }

    tracing::info!(
        windows = inputs.shape()[0],
        train = train_x.shape()[0],
        validation = val_x.shape()[0],
        epochs = config.epochs,
        "starting training run"
    );

    let mut model = RecurrentRegressor::new(config.clone());
    let history = model.fit(&train_x, &train_y, &val_x, &val_y)?;

    let predicted = model.predict_batch(&val_x)?;
    let mse = metrics::mean_squared_error(&val_y, &predicted);
    let outcome = TrainingOutcome {
        architecture: config.architecture_summary(),
        hyperparameters: Hyperparameters::from(config),
        metrics: EvaluationMetrics {
            mse,
            mae: metrics::mean_absolute_error(&val_y, &predicted),
            rmse: mse.sqrt(),
            r2_score: metrics::r_squared(&val_y, &predicted),
            directional_accuracy: metrics::directional_accuracy(&val_y, &predicted),
            training_time: started.elapsed().as_secs_f64(),
        },
        history,
    };

    tracing::info!(
        mse = outcome.metrics.mse,
        directional_accuracy = outcome.metrics.directional_accuracy,
        seconds = outcome.metrics.training_time,
        "training run finished"
    );

    Ok((model, scaler, outcome))
}

/// Persist the trained model and fitted scaler under `dir`.
pub fn persist_artifacts(
    dir: &Path,
    model: &RecurrentRegressor,
    scaler: &MinMaxScaler,
) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    model.save(&dir.join(MODEL_FILE))?;
    scaler.save_json(dir.join(SCALER_FILE))?;
    Ok(())
}

/// Restore previously persisted artifacts.
///
/// Missing files mean no training run has completed on this artifact
/// directory yet, which callers treat the same as an untrained session.
pub fn load_artifacts(dir: &Path) -> Result<(RecurrentRegressor, MinMaxScaler)> {
    let model_path = dir.join(MODEL_FILE);
    let scaler_path = dir.join(SCALER_FILE);
    if !model_path.exists() || !scaler_path.exists() {
        return Err(ForecastError::ModelNotTrained);
    }
    let model = RecurrentRegressor::load(model_path)?;
    let scaler = MinMaxScaler::load_json(scaler_path)?;
    Ok((model, scaler))
}
