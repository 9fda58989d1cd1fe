use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::Session;
use crate::database::models::{NewRoutine, Routine, RoutinePatch};
use crate::handlers::{Deleted, OwnerQuery};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::RoutineService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CompletionBody {
    pub completed: bool,
}

/// GET /api/routines
pub async fn routines_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Vec<Routine>> {
    let routines = RoutineService::new(&state, session).list(query.user_id).await?;
    Ok(ApiResponse::success(routines))
}

/// POST /api/routines
pub async fn routines_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<NewRoutine>,
) -> ApiResult<Routine> {
    let routine = RoutineService::new(&state, session).create(body).await?;
    Ok(ApiResponse::created(routine))
}

/// PATCH /api/routines/:id
pub async fn routine_patch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<RoutinePatch>,
) -> ApiResult<Routine> {
    let routine = RoutineService::new(&state, session).update(id, body).await?;
    Ok(ApiResponse::success(routine))
}

/// PUT /api/routines/:id/completion
pub async fn routine_completion_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<CompletionBody>,
) -> ApiResult<Routine> {
    let routine = RoutineService::new(&state, session).toggle(id, body.completed).await?;
    Ok(ApiResponse::success(routine))
}

/// DELETE /api/routines/:id
pub async fn routine_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deleted> {
    let deleted = RoutineService::new(&state, session).delete(id).await?;
    Ok(ApiResponse::success(Deleted { deleted }))
}
