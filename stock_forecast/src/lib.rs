//! # Stock Forecast
//!
//! Sequence windowing, normalization, model training and rolling OHLC
//! forecasts over canonical price data.
//!
//! ## Features
//!
//! - Feature-wise min-max normalization with JSON persistence
//! - Fixed-length sequence windowing with temporal train/validation splits
//! - A narrow [`SequenceModel`] trait so the forecast logic can be tested
//!   against a deterministic stub
//! - An in-tree recurrent regressor collaborator with bincode persistence
//! - Regression metrics plus directional accuracy
//! - Autoregressive rolling forecasts with a decaying confidence heuristic
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stock_data::Dataset;
//! use stock_forecast::{roll_forward, train_model, TrainingConfig};
//!
//! let dataset = Dataset::from_csv_path("prices.csv")?;
//! let config = TrainingConfig::default();
//!
//! let (model, scaler, outcome) = train_model(&dataset, &config)?;
//! println!("validation RMSE {:.4}", outcome.metrics.rmse);
//!
//! let recent = dataset.last_n(config.window);
//! let steps = roll_forward(&model, &scaler, recent, 5)?;
//! for step in steps {
//!     println!("{}: close {:.2}", step.date, step.predicted_close);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod forecast;
pub mod metrics;
pub mod model;
pub mod scaler;
pub mod trainer;
pub mod window;

// Re-export commonly used types
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{roll_forward, ForecastStep};
pub use crate::model::{RecurrentRegressor, SequenceModel, TrainingConfig, TrainingHistory};
pub use crate::scaler::MinMaxScaler;
pub use crate::trainer::{
    load_artifacts, persist_artifacts, train_model, EvaluationMetrics, Hyperparameters,
    TrainingOutcome,
};
pub use crate::window::{build_sequences, temporal_split, DEFAULT_WINDOW, TARGETS};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
