use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use scaleops_core::export::{ExportedFile, Exporter};
use scaleops_core::history::HistoryEntry;
use scaleops_core::types::ExportFormat;
use scaleops_core::ScaleOpsError;

use crate::error::AppError;
use crate::state::AppState;

const FALLBACK_HEADER: HeaderName = HeaderName::from_static("x-export-fallback");

/// GET /api/items: ids of every item with saved state.
pub async fn list_items(State(app): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let workflow = app.workflow.clone();
    let ids = tokio::task::spawn_blocking(move || workflow.store().list_items())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(ids))
}

/// GET /api/items/:id/history: newest first.
pub async fn history(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    let workflow = app.workflow.clone();
    let entries = tokio::task::spawn_blocking(move || workflow.history(&id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(entries))
}

/// GET /api/items/:id/export/:format: document bytes as an attachment.
pub async fn export(
    State(app): State<AppState>,
    Path((id, format)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse()?;
    let workflow = app.workflow.clone();
    let file = tokio::task::spawn_blocking(move || {
        let exporter = Exporter::from_config(workflow.config())?;
        let doc = workflow.document(&id)?;
        Ok::<ExportedFile, ScaleOpsError>(exporter.export(&doc, format)?)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let mut response = (
        [
            (CONTENT_TYPE, file.format.content_type().to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response();
    if let Some(requested) = file.fallback_from {
        response
            .headers_mut()
            .insert(FALLBACK_HEADER, HeaderValue::from_static(requested.as_str()));
    }
    Ok(response)
}
