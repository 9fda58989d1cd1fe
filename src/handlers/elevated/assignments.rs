use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::Session;
use crate::database::models::Assignment;
use crate::handlers::Deleted;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::AssignmentService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AssignmentQuery {
    pub psychiatrist_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentBody {
    pub psychiatrist_id: Uuid,
    pub patient_id: Uuid,
}

/// GET /api/admin/assignments
pub async fn assignments_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<AssignmentQuery>,
) -> ApiResult<Vec<Assignment>> {
    let rows = AssignmentService::new(&state, session).list(query.psychiatrist_id).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/admin/assignments
pub async fn assignments_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<AssignmentBody>,
) -> ApiResult<Assignment> {
    let row = AssignmentService::new(&state, session)
        .assign(body.psychiatrist_id, body.patient_id)
        .await?;
    Ok(ApiResponse::created(row))
}

/// DELETE /api/admin/assignments
pub async fn assignments_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<AssignmentBody>,
) -> ApiResult<Deleted> {
    let deleted = AssignmentService::new(&state, session)
        .unassign(body.psychiatrist_id, body.patient_id)
        .await?;
    Ok(ApiResponse::success(Deleted { deleted }))
}
