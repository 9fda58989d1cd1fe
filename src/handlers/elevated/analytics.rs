use axum::{extract::State, Extension};

use crate::access::Session;
use crate::aggregate::PlatformAnalytics;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::AnalyticsService;
use crate::state::AppState;

/// GET /api/admin/analytics - platform-wide routine, mood and hours summaries
pub async fn platform_analytics_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> ApiResult<PlatformAnalytics> {
    let analytics = AnalyticsService::new(&state, session).platform().await?;
    Ok(ApiResponse::success(analytics))
}
