use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use stock_data::{CanonicalRecord, Dataset};
use stock_forecast::{
    load_artifacts, persist_artifacts, roll_forward, train_model, ForecastError, TrainingConfig,
};

/// Smooth synthetic market: a slow sine swing on top of a mild drift.
fn synthetic_dataset(days: usize) -> Dataset {
    let records: Vec<CanonicalRecord> = (0..days)
        .map(|i| {
            let base = 120.0 + 10.0 * (i as f64 * 0.1).sin() + i as f64 * 0.05;
            CanonicalRecord {
                date: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap()
                    + chrono::Days::new(i as u64),
                open: base,
                high: base + 1.5,
                low: base - 1.2,
                close: base + 0.4,
                volume: 900_000.0 + (i as f64 * 0.35).cos().abs() * 100_000.0,
            }
        })
        .collect();
    Dataset::from_records(records).unwrap()
}

fn quick_config() -> TrainingConfig {
    TrainingConfig {
        epochs: 5,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_full_training_run() {
    let dataset = synthetic_dataset(200);
    let config = quick_config();

    let (_model, _scaler, outcome) = train_model(&dataset, &config).unwrap();

    // 200 rows with a 60-row window yield 140 pairs split 112/28.
    assert_eq!(outcome.history.loss.len(), config.epochs);
    assert_eq!(outcome.history.val_loss.len(), config.epochs);
    assert!(outcome.history.loss.iter().all(|l| l.is_finite()));

    let metrics = &outcome.metrics;
    assert!(metrics.mse.is_finite() && metrics.mse >= 0.0);
    assert!(metrics.mae.is_finite() && metrics.mae >= 0.0);
    assert!((metrics.rmse - metrics.mse.sqrt()).abs() < 1e-12);
    assert!(metrics.r2_score <= 1.0);
    assert!((0.0..=100.0).contains(&metrics.directional_accuracy));
    assert!(metrics.training_time >= 0.0);

    assert_eq!(outcome.hyperparameters.sequence_length, 60);
    assert_eq!(outcome.hyperparameters.layers, vec![64, 32]);
    assert_eq!(outcome.hyperparameters.epochs, config.epochs);
    assert!(outcome.architecture.contains("Recurrent(64)"));
}

#[test]
fn test_default_hyperparameters() {
    let config = TrainingConfig::default();
    assert_eq!(config.window, 60);
    assert_eq!(config.recurrent_widths, [64, 32]);
    assert_eq!(config.dropout, 0.2);
    assert_eq!(config.dense_width, 16);
    assert_eq!(config.outputs, 4);
    assert_eq!(config.epochs, 50);
    assert_eq!(config.batch_size, 32);
    assert_eq!(config.learning_rate, 0.001);
}

#[test]
fn test_window_longer_than_dataset_rejected() {
    let dataset = synthetic_dataset(110);
    let config = TrainingConfig {
        window: 150,
        ..quick_config()
    };

    assert!(matches!(
        train_model(&dataset, &config).unwrap_err(),
        ForecastError::InsufficientData { .. }
    ));
}

#[test]
fn test_artifacts_round_trip() {
    let dataset = synthetic_dataset(200);
    let config = quick_config();
    let (model, scaler, _) = train_model(&dataset, &config).unwrap();

    let dir = tempfile::tempdir().unwrap();
    persist_artifacts(dir.path(), &model, &scaler).unwrap();
    assert!(dir.path().join("recurrent_model.bin").exists());
    assert!(dir.path().join("scaler.json").exists());

    let (restored_model, restored_scaler) = load_artifacts(dir.path()).unwrap();
    assert_eq!(scaler, restored_scaler);

    // The restored pair must forecast identically to the live pair.
    let recent = dataset.last_n(config.window);
    let live = roll_forward(&model, &scaler, recent, 5).unwrap();
    let reloaded = roll_forward(&restored_model, &restored_scaler, recent, 5).unwrap();
    assert_eq!(live, reloaded);
}

#[test]
fn test_missing_artifacts_read_as_untrained() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_artifacts(dir.path()).unwrap_err(),
        ForecastError::ModelNotTrained
    ));
}

#[test]
fn test_forecast_after_training_scenario() {
    // Train on 200 rows with the default 60-day window, then ask for five
    // days: exactly five steps with the documented confidence schedule.
    let dataset = synthetic_dataset(200);
    let config = quick_config();
    let (model, scaler, _) = train_model(&dataset, &config).unwrap();

    let steps = roll_forward(&model, &scaler, dataset.last_n(config.window), 5).unwrap();

    assert_eq!(steps.len(), 5);
    let confidences: Vec<f64> = steps.iter().map(|s| s.confidence).collect();
    assert_eq!(confidences, vec![95.0, 93.0, 91.0, 89.0, 87.0]);
    for step in &steps {
        assert!(step.predicted_close.is_finite());
        assert!(step.predicted_open.is_finite());
    }
}
