use axum::{extract::State, Extension};
use serde::Deserialize;

use crate::access::Session;
use crate::database::models::{present, Profile};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::ProfileService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileBody {
    /// Absent leaves the name alone, `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub full_name: Option<Option<String>>,
}

/// PUT /api/profile - create the caller's profile or rename it
pub async fn profile_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<ProfileBody>,
) -> ApiResult<Profile> {
    let profile = ProfileService::new(&state, session).upsert_own(body.full_name).await?;
    Ok(ApiResponse::success(profile))
}
