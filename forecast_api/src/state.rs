//! Shared application state.

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::ForecastConfig;
use stock_data::Dataset;
use stock_forecast::{MinMaxScaler, RecurrentRegressor};

/// The process-wide modelling session: current dataset, fitted scaler and
/// trained model. Each slot is replaced wholesale on the success path of its
/// owning operation and never partially mutated.
#[derive(Default)]
pub struct Session {
    pub dataset: Option<Dataset>,
    pub scaler: Option<MinMaxScaler>,
    pub model: Option<RecurrentRegressor>,
}

/// Shared application state, passed to all route handlers via
/// `axum::extract::State`.
pub struct AppState {
    pub config: ForecastConfig,
    pub session: RwLock<Session>,
    /// Serializes training runs: at most one may be in flight per process.
    pub train_gate: Mutex<()>,
}

impl AppState {
    pub fn new(config: ForecastConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            session: RwLock::new(Session::default()),
            train_gate: Mutex::new(()),
        })
    }
}
