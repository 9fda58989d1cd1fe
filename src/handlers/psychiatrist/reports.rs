use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::access::Session;
use crate::database::models::{HydratedReport, NewUserReport, UserReportPatch};
use crate::handlers::Deleted;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::ReportService;
use crate::state::AppState;

/// GET /api/psychiatrist/reports - reports the caller wrote
pub async fn reports_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<HydratedReport>> {
    let reports = ReportService::new(&state, session).by_psychiatrist().await?;
    Ok(ApiResponse::success(reports))
}

/// POST /api/psychiatrist/reports
pub async fn reports_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<NewUserReport>,
) -> ApiResult<HydratedReport> {
    let report = ReportService::new(&state, session).create(body).await?;
    Ok(ApiResponse::created(report))
}

/// PATCH /api/psychiatrist/reports/:id
pub async fn report_patch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UserReportPatch>,
) -> ApiResult<HydratedReport> {
    let report = ReportService::new(&state, session).update(id, body).await?;
    Ok(ApiResponse::success(report))
}

/// DELETE /api/psychiatrist/reports/:id
pub async fn report_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    let deleted = ReportService::new(&state, session).delete(id).await?;
    Ok(ApiResponse::success(Deleted { deleted }))
}
