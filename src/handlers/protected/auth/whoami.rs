// handlers/protected/auth/whoami.rs - GET /api/auth/whoami

use axum::{extract::State, Extension};

use crate::access::Session;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ProfileService, WhoAmI};
use crate::state::AppState;

/// Identity from the token, the outcome of the role lookup, and the profile if there is one
pub async fn whoami_get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<WhoAmI> {
    let whoami = ProfileService::new(&state, session).whoami().await?;
    Ok(ApiResponse::success(whoami))
}
