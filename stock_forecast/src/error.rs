//! Error types for the stock_forecast crate

use thiserror::Error;

/// Custom error types for training and forecasting
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Not enough rows to build the requested sequence windows
    #[error("insufficient data: need at least {required} rows, found {found}")]
    InsufficientData { required: usize, found: usize },

    /// A prediction was requested before training produced a model
    #[error("no trained model available")]
    ModelNotTrained,

    /// Forecast horizon must be a positive number of days
    #[error("forecast horizon must be at least 1 day")]
    InvalidHorizon,

    /// Error from invalid parameters
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error persisting or restoring artifacts
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<bincode::Error> for ForecastError {
    fn from(err: bincode::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}
