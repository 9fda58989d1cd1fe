mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::TestApp;
use habitual_api::database::models::{Entity, Profile, Role};

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let app = TestApp::new();
    let res = app.request(Method::GET, "/health", None, None).await?;

    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["status"], "ok");
    assert_eq!(res.data()["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn root_identifies_service() -> Result<()> {
    let app = TestApp::new();
    let res = app.request(Method::GET, "/", None, None).await?;

    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["name"], "habitual-api");
    Ok(())
}

#[tokio::test]
async fn api_requires_bearer_token() -> Result<()> {
    let app = TestApp::new();
    let res = app.request(Method::GET, "/api/routines", None, None).await?;

    res.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], true);
    assert_eq!(res.body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn garbage_token_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let mut user = TestApp::token_for(Uuid::new_v4(), "who@example.com")?;
    user.token = "not.a.token".to_string();

    let res = app.get("/api/auth/whoami", &user).await?;
    res.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_without_profile_defaults_to_user() -> Result<()> {
    let app = TestApp::new();
    let user = TestApp::token_for(Uuid::new_v4(), "new@example.com")?;

    let res = app.get("/api/auth/whoami", &user).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["role_lookup"]["status"], "not_found");
    assert_eq!(res.data()["role"], "user");
    assert!(res.data()["profile"].is_null());
    Ok(())
}

#[tokio::test]
async fn whoami_reports_resolved_role() -> Result<()> {
    let app = TestApp::new();
    let doctor = app.seed_profile(Role::Psychiatrist, "Doc").await?;

    let res = app.get("/api/auth/whoami", &doctor).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["role_lookup"], json!({ "status": "resolved", "role": "psychiatrist" }));
    assert_eq!(res.data()["identity"]["id"], json!(doctor.id));
    Ok(())
}

#[tokio::test]
async fn profile_put_creates_user_profile_and_ignores_role() -> Result<()> {
    let app = TestApp::new();
    let user = TestApp::token_for(Uuid::new_v4(), "fresh@example.com")?;

    let res = app
        .put("/api/profile", &user, json!({ "full_name": "  Fresh Start ", "role": "admin" }))
        .await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["full_name"], "Fresh Start");
    assert_eq!(res.data()["role"], "user");
    assert_eq!(res.data()["email"], "fresh@example.com");

    let res = app.get("/api/admin/users", &user).await?;
    res.assert_status(StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn role_lookup_failure_denies_privileged_routes() -> Result<()> {
    let app = TestApp::new();
    let admin = app.seed_profile(Role::Admin, "Ada").await?;
    app.store.fail_table(Profile::TABLE).await;

    let res = app.get("/api/auth/whoami", &admin).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["role_lookup"]["status"], "transient_error");
    assert_eq!(res.data()["role"], "user");

    let res = app.get("/api/admin/users/counts", &admin).await?;
    res.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Admin access required");
    Ok(())
}

#[tokio::test]
async fn malformed_json_uses_error_envelope() -> Result<()> {
    let app = TestApp::new();
    let user = app.seed_profile(Role::User, "Uma").await?;

    let res = app.post("/api/moods", &user, json!({ "mood": "ecstatic" })).await?;
    res.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(res.body["code"], "INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn profile_put_without_name_keeps_existing_name() -> Result<()> {
    let app = TestApp::new();
    let user = app.seed_profile(Role::User, "Nadia").await?;

    let res = app.put("/api/profile", &user, json!({})).await?;
    res.assert_status(StatusCode::OK);
    assert_eq!(res.data()["full_name"], "Nadia");

    let res = app.put("/api/profile", &user, json!({ "full_name": null })).await?;
    res.assert_status(StatusCode::OK);
    assert!(res.data()["full_name"].is_null());
    Ok(())
}
