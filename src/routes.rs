use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::handlers::{elevated, protected, psychiatrist, public};
use crate::middleware::{jwt_auth_middleware, session_middleware};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(user_routes())
        .nest("/psychiatrist", psychiatrist_routes())
        .nest("/admin", admin_routes())
        // token first, then role resolution
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(jwt_auth_middleware))
                .layer(from_fn_with_state(state.clone(), session_middleware)),
        );

    let app = Router::new()
        .route("/", get(public::root_get))
        .route("/health", get(public::health_get))
        .nest("/api", api)
        .with_state(state);

    let config = config::config();
    let app = if config.security.enable_cors {
        app.layer(cors_layer(&config.security))
    } else {
        app
    };

    if config.api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn user_routes() -> Router<AppState> {
    use protected::{analytics, auth, moods, profile, psychology, reports, routines, views};

    Router::new()
        .route("/auth/whoami", get(auth::whoami_get))
        .route("/profile", put(profile::profile_put))
        .route("/routines", get(routines::routines_get).post(routines::routines_post))
        .route("/routines/:id", patch(routines::routine_patch).delete(routines::routine_delete))
        .route("/routines/:id/completion", put(routines::routine_completion_put))
        .route("/moods", get(moods::moods_get).post(moods::moods_post))
        .route("/analytics", get(analytics::analytics_get).put(analytics::analytics_put))
        .route("/analytics/weekly", get(analytics::analytics_weekly_get))
        .route("/reports", get(reports::reports_get))
        .route("/reports/:id", get(reports::report_get))
        .route("/psychology/reports", get(psychology::psychology_reports_get))
        .route("/views/events", get(views::view_events_get))
}

fn psychiatrist_routes() -> Router<AppState> {
    use psychiatrist::{patients, reports};

    Router::new()
        .route("/patients", get(patients::patients_get))
        .route("/patients/stats", get(patients::patients_stats_get))
        .route("/patients/:id", get(patients::patient_get))
        .route("/patients/:id/reports", get(patients::patient_reports_get))
        .route("/reports", get(reports::reports_get).post(reports::reports_post))
        .route("/reports/:id", patch(reports::report_patch).delete(reports::report_delete))
}

fn admin_routes() -> Router<AppState> {
    use elevated::{analytics, assignments, reports, users};

    Router::new()
        .route("/users", get(users::users_get))
        .route("/users/counts", get(users::user_counts_get))
        .route("/users/:id/role", put(users::user_role_put))
        .route("/analytics", get(analytics::platform_analytics_get))
        .route("/reports", get(reports::all_reports_get))
        .route(
            "/assignments",
            get(assignments::assignments_get)
                .post(assignments::assignments_post)
                .delete(assignments::assignments_delete),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
