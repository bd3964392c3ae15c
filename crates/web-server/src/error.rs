use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use engine::AnalysisError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error("Malformed request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Analysis(e @ AnalysisError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, e.code(), e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::InsufficientHistory(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.code(), e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::DataUnavailable(_)) => {
                (StatusCode::BAD_GATEWAY, e.code(), e.to_string())
            }
            AppError::Analysis(e @ AnalysisError::InternalComputation(_)) => {
                tracing::error!(error = %e, "Internal computation error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    e.code(),
                    "An internal error occurred during analysis".to_string(),
                )
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "invalid_input", message.clone())
            }
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail) = self.parts();
        let body = Json(json!({ "detail": detail, "code": code }));
        (status, body).into_response()
    }
}
