//! # Forecast API
//!
//! HTTP binding for the stock forecasting pipeline: upload OHLCV data, train
//! the sequence model and request rolling multi-day forecasts.
//!
//! The router is exposed as a library function so tests can drive the whole
//! service in-process against an injected [`state::AppState`].

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use crate::config::ForecastConfig;
pub use crate::error::ApiError;
pub use crate::state::{AppState, Session};

/// Build the complete service with all layers applied.
pub fn app(state: Arc<AppState>) -> Router {
    let max_upload = state.config.max_upload_bytes;
    routes::router()
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
