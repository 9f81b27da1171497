use axum::extract::State;
use axum::Json;
use scaleops_core::analysis::AnalysisResult;
use scaleops_core::sync::AnalysisRequest;
use scaleops_core::workflow::SaveStatus;
use scaleops_core::ScaleOpsError;

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/analysis: score responses, persist and record in history.
pub async fn analyze(
    State(app): State<AppState>,
    Json(body): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let workflow = app.workflow.clone();
    let result = tokio::task::spawn_blocking(move || {
        let report = workflow.analyze(&body.item_id, &body.responses)?;
        if let SaveStatus::Unsaved { reason } = report.save {
            return Err(ScaleOpsError::Storage(reason));
        }
        Ok::<_, ScaleOpsError>(report.result)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
