use axum::extract::{Path, State};
use axum::Json;
use scaleops_core::history;
use scaleops_core::sync::{SaveRequest, WorkspaceSnapshot};
use scaleops_core::ScaleOpsError;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/workspace/save: store mirrored answers and/or analysis. A
/// mirrored analysis is also recorded in history, in the same write as the
/// answers.
pub async fn save(
    State(app): State<AppState>,
    Json(body): Json<SaveRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.payload.answers.is_none() && body.payload.analysis.is_none() {
        return Err(AppError::bad_request("nothing to save"));
    }
    let workflow = app.workflow.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = workflow.store();
        let SaveRequest { item_id, payload } = body;
        if let Some(analysis) = &payload.analysis {
            analysis.check()?;
        }
        let revision = match (&payload.answers, &payload.analysis) {
            (answers, Some(analysis)) => {
                let limit = workflow.config().history_limit;
                history::record(store, &item_id, answers.as_ref(), analysis, limit)?.revision
            }
            (Some(answers), None) => store.save_answers(&item_id, answers)?,
            (None, None) => {
                return Err(ScaleOpsError::Validation("nothing to save".to_string()))
            }
        };
        tracing::info!(item = %item_id, revision, "workspace saved");
        Ok::<_, ScaleOpsError>(serde_json::json!({
            "saved": true,
            "revision": revision,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/workspace/load/:id: answers, latest analysis and active tab.
pub async fn load(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkspaceSnapshot>, AppError> {
    let workflow = app.workflow.clone();
    let snapshot = tokio::task::spawn_blocking(move || workflow.snapshot(&id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(snapshot))
}
