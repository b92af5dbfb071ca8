//! API route handlers.

use axum::extract::{Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;
use stock_data::Dataset;
use stock_forecast::{persist_artifacts, roll_forward, train_model};

/// Days forecast when the caller does not say otherwise.
pub const DEFAULT_HORIZON: usize = 5;

/// Assemble the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/upload-data", post(upload_data))
        .route("/api/train-model", post(train))
        .route("/api/predict", post(predict))
        .route("/api/health", get(health))
}

/// POST /api/upload-data — validate a multipart CSV upload and install it as
/// the session dataset.
async fn upload_data(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut payload: Option<axum::body::Bytes> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart payload: {e}")))?
    {
        let named_file = field.name() == Some("file");
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("could not read upload: {e}")))?;
        // Prefer the field named "file"; otherwise fall back to the first one.
        if named_file {
            payload = Some(bytes);
            break;
        }
        if payload.is_none() {
            payload = Some(bytes);
        }
    }
    let payload = payload
        .ok_or_else(|| ApiError::BadRequest("multipart upload must include a file field".to_string()))?;

    let dataset = Dataset::from_csv_bytes(&payload)?;
    let summary = dataset.summary();
    tracing::info!(
        records = summary.total_records,
        start = %summary.date_range.start,
        end = %summary.date_range.end,
        "dataset uploaded"
    );

    state.session.write().await.dataset = Some(dataset);

    Ok(Json(json!({
        "status": "success",
        "message": "Data uploaded successfully",
        "stats": summary,
    })))
}

/// POST /api/train-model — run one blocking training pass over the current
/// dataset, then install the model and scaler.
async fn train(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    // Single-flight: a concurrent training request waits its turn rather
    // than racing the session state.
    let _gate = state.train_gate.lock().await;

    let dataset = {
        let session = state.session.read().await;
        session.dataset.clone().ok_or(ApiError::NoData)?
    };
    let config = state.config.training.clone();
    let artifacts_dir = state.config.artifacts_dir.clone();

    let (model, scaler, outcome) = tokio::task::spawn_blocking(move || {
        let (model, scaler, outcome) = train_model(&dataset, &config)?;
        persist_artifacts(&artifacts_dir, &model, &scaler)?;
        Ok::<_, stock_forecast::ForecastError>((model, scaler, outcome))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("training task failed: {e}")))??;

    {
        let mut session = state.session.write().await;
        session.model = Some(model);
        session.scaler = Some(scaler);
    }

    Ok(Json(json!({
        "status": "success",
        "model_info": {
            "type": outcome.hyperparameters.model_type,
            "layers": outcome.hyperparameters.layers,
            "epochs": outcome.hyperparameters.epochs,
            "batch_size": outcome.hyperparameters.batch_size,
            "learning_rate": outcome.hyperparameters.learning_rate,
            "sequence_length": outcome.hyperparameters.sequence_length,
            "architecture": outcome.architecture,
        },
        "metrics": outcome.metrics,
        "training_history": outcome.history,
    })))
}

/// Query for POST /api/predict.
#[derive(Debug, Deserialize)]
struct PredictQuery {
    days: Option<usize>,
}

/// POST /api/predict?days=N — roll the trained model forward N days.
async fn predict(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PredictQuery>,
) -> Result<Json<Value>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_HORIZON);
    if days == 0 {
        return Err(ApiError::BadRequest("days must be at least 1".to_string()));
    }

    let session = state.session.read().await;
    let (model, scaler) = match (&session.model, &session.scaler) {
        (Some(model), Some(scaler)) => (model, scaler),
        _ => return Err(ApiError::ModelNotTrained),
    };
    let dataset = session.dataset.as_ref().ok_or(ApiError::NoData)?;

    let recent = dataset.last_n(state.config.training.window);
    let steps = roll_forward(model, scaler, recent, days)?;

    Ok(Json(json!({
        "status": "success",
        "predictions": steps,
    })))
}

/// GET /api/health — liveness only.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
