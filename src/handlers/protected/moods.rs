use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::Session;
use crate::database::models::{MoodLog, NewMoodLog};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::MoodService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub user_id: Option<Uuid>,
    pub limit: Option<i32>,
}

/// GET /api/moods - newest first
pub async fn moods_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<MoodQuery>,
) -> ApiResult<Vec<MoodLog>> {
    let moods = MoodService::new(&state, session).list(query.user_id, query.limit).await?;
    Ok(ApiResponse::success(moods))
}

/// POST /api/moods
pub async fn moods_post(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<NewMoodLog>,
) -> ApiResult<MoodLog> {
    let log = MoodService::new(&state, session).create(body).await?;
    Ok(ApiResponse::created(log))
}
