use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::access::Session;
use crate::aggregate::RoleCounts;
use crate::database::models::{Profile, Role};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::ProfileService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub role: Role,
}

/// GET /api/admin/users
pub async fn users_get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Vec<Profile>> {
    let users = ProfileService::new(&state, session).get_all_users().await?;
    Ok(ApiResponse::success(users))
}

/// PUT /api/admin/users/:id/role
pub async fn user_role_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<RoleBody>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state, session).update_user_role(id, body.role).await?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/admin/users/counts
pub async fn user_counts_get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<RoleCounts> {
    let counts = ProfileService::new(&state, session).role_counts().await?;
    Ok(ApiResponse::success(counts))
}
