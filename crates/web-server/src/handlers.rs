use crate::{AppState, error::AppError};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::header,
    response::{IntoResponse, Response},
};
use engine::RawAnalysisRequest;
use reporting::{ExportFormat, SummaryResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Query parameters of the export route.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ExportQuery {
    /// `xlsx` (default) or `csv`.
    #[serde(default)]
    pub format: ExportFormat,
}

/// # GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "API is live" }))
}

/// # GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// # POST /api/summary
pub async fn post_summary(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RawAnalysisRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let Json(raw) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let summary = state.analyzer.run_summary(&raw).await?;
    Ok(Json(summary))
}

/// # GET /api/summary
/// Same as the POST variant with the fields passed as query parameters.
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RawAnalysisRequest>, QueryRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let Query(raw) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let summary = state.analyzer.run_summary(&raw).await?;
    Ok(Json(summary))
}

/// # POST /api/excel?format=xlsx|csv
/// Returns the backtest export as a file attachment.
pub async fn post_export(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExportQuery>, QueryRejection>,
    body: Result<Json<RawAnalysisRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Query(ExportQuery { format }) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let Json(raw) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let file = state.analyzer.run_export(&raw, format).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
