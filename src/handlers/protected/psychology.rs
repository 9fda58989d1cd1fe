use axum::extract::State;

use crate::database::models::PsychologyReport;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LibraryService;
use crate::state::AppState;

/// GET /api/psychology/reports - the shared library, newest first
pub async fn psychology_reports_get(State(state): State<AppState>) -> ApiResult<Vec<PsychologyReport>> {
    let articles = LibraryService::new(&state).list().await?;
    Ok(ApiResponse::success(articles))
}
