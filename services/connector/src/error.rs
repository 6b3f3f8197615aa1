use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::ValidationError;

use crate::forwarder::ForwardResult;

/// Central error type for the connector
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Snapshot forward failed: {message}")]
    Forward { status: StatusCode, message: String },
}

impl AppError {
    /// Map a non-accepted forward outcome
    pub fn from_forward(result: ForwardResult) -> Self {
        let status = result.status_code();
        let message = match result {
            ForwardResult::Accepted => "Snapshot accepted".to_string(),
            ForwardResult::InvalidSnapshot(message) | ForwardResult::Misconfigured(message) => message,
            ForwardResult::Upstream { message, .. } => message,
        };
        AppError::Forward { status, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_failed",
                    "field": err.field(),
                    "message": err.to_string(),
                }),
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "bad_request", "message": msg }),
            ),
            AppError::Forward { status, message } => (
                status,
                json!({ "error": "forward_failed", "message": message }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
