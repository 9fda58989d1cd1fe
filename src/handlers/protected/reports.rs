use axum::{
    extract::{Path, Query, State},
    Extension,
};
use uuid::Uuid;

use crate::access::Session;
use crate::database::models::HydratedReport;
use crate::handlers::OwnerQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::ReportService;
use crate::state::AppState;

/// GET /api/reports[?user_id] - reports about the caller (or `user_id`) the caller may read
pub async fn reports_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Vec<HydratedReport>> {
    let reports = ReportService::new(&state, session).for_user(query.user_id).await?;
    Ok(ApiResponse::success(reports))
}

/// GET /api/reports/:id
pub async fn report_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<HydratedReport> {
    let report = ReportService::new(&state, session).by_id(id).await?;
    Ok(ApiResponse::success(report))
}
