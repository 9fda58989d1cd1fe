use axum::{extract::State, Extension};

use crate::access::Session;
use crate::database::models::HydratedReport;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ReportService;
use crate::state::AppState;

/// GET /api/admin/reports - every report shared with the care team, plus any the admin wrote
pub async fn all_reports_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<HydratedReport>> {
    let reports = ReportService::new(&state, session).all().await?;
    Ok(ApiResponse::success(reports))
}
