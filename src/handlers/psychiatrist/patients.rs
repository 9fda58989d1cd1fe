use axum::{
    extract::{Path, State},
    Extension,
};
use uuid::Uuid;

use crate::access::Session;
use crate::aggregate::PatientDetail;
use crate::database::models::{HydratedReport, Profile};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AssignmentService, PatientService, ReportService};
use crate::state::AppState;

/// GET /api/psychiatrist/patients - assigned patients by name
pub async fn patients_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<Profile>> {
    let patients = AssignmentService::new(&state, session).list_assigned_patients().await?;
    Ok(ApiResponse::success(patients))
}

/// GET /api/psychiatrist/patients/stats
pub async fn patients_stats_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<Vec<PatientDetail>> {
    let stats = PatientService::new(&state, session).stats().await?;
    Ok(ApiResponse::success(stats))
}

/// GET /api/psychiatrist/patients/:id
pub async fn patient_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<PatientDetail> {
    let detail = PatientService::new(&state, session).detail(id).await?;
    Ok(ApiResponse::success(detail))
}

/// GET /api/psychiatrist/patients/:id/reports
pub async fn patient_reports_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<HydratedReport>> {
    let reports = ReportService::new(&state, session).for_user(Some(id)).await?;
    Ok(ApiResponse::success(reports))
}
