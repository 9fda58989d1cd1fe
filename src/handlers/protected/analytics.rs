use axum::{
    extract::{Query, State},
    Extension,
};

use crate::access::Session;
use crate::aggregate::DayProgress;
use crate::database::models::{AnalyticsSample, NewAnalyticsSample};
use crate::handlers::OwnerQuery;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::AnalyticsService;
use crate::state::AppState;

/// GET /api/analytics
pub async fn analytics_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Vec<AnalyticsSample>> {
    let samples = AnalyticsService::new(&state, session).list(query.user_id).await?;
    Ok(ApiResponse::success(samples))
}

/// PUT /api/analytics - record hours for a day
pub async fn analytics_put(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    ApiJson(body): ApiJson<NewAnalyticsSample>,
) -> ApiResult<AnalyticsSample> {
    let sample = AnalyticsService::new(&state, session).upsert(body).await?;
    Ok(ApiResponse::success(sample))
}

/// GET /api/analytics/weekly - last seven days
pub async fn analytics_weekly_get(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Query(query): Query<OwnerQuery>,
) -> ApiResult<Vec<DayProgress>> {
    let week = AnalyticsService::new(&state, session).weekly(query.user_id).await?;
    Ok(ApiResponse::success(week))
}
