//! Unified error type for API responses.
//!
//! Every failure crossing the operation boundary becomes a structured JSON
//! body carrying a human-readable message and, where useful, an actionable
//! suggestion. Nothing in the shared session state is mutated on an error
//! path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stock_data::DataError;
use stock_forecast::ForecastError;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete input data.
    Validation {
        message: String,
        suggestion: Option<String>,
        required: Option<Vec<String>>,
        available: Option<Vec<String>>,
    },
    /// The operation requires a prior successful upload.
    NoData,
    /// The operation requires a prior successful training run.
    ModelNotTrained,
    /// The request itself is unusable (bad query, bad multipart).
    BadRequest(String),
    /// Unexpected failure in the collaborator layer.
    Internal(String),
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        let suggestion = err.suggestion();
        match err {
            DataError::MissingColumns {
                missing,
                required,
                available,
            } => ApiError::Validation {
                message: format!("Missing required columns: {missing:?}"),
                suggestion,
                required: Some(required),
                available: Some(available),
            },
            DataError::Io(e) => ApiError::Internal(e.to_string()),
            other => ApiError::Validation {
                message: other.to_string(),
                suggestion,
                required: None,
                available: None,
            },
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(err: ForecastError) -> Self {
        match &err {
            ForecastError::ModelNotTrained => ApiError::ModelNotTrained,
            ForecastError::InvalidHorizon => ApiError::BadRequest(err.to_string()),
            ForecastError::InsufficientData { .. } | ForecastError::InvalidParameter(_) => {
                ApiError::Validation {
                    message: err.to_string(),
                    suggestion: None,
                    required: None,
                    available: None,
                }
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation {
                message,
                suggestion,
                required,
                available,
            } => {
                let mut body = json!({ "error": message });
                if let Some(suggestion) = suggestion {
                    body["suggestion"] = json!(suggestion);
                }
                if let Some(required) = required {
                    body["required_columns"] = json!(required);
                }
                if let Some(available) = available {
                    body["available_columns"] = json!(available);
                }
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::NoData => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No training data available. Please upload data first." }),
            ),
            ApiError::ModelNotTrained => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No trained model available. Please train a model first." }),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
