#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use habitual_api::auth::{generate_jwt, Claims};
use habitual_api::database::models::{Assignment, Profile, Role};
use habitual_api::database::{MemoryStore, Repository};
use habitual_api::routes;
use habitual_api::state::AppState;

/// The full router over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    router: Router,
}

/// A seeded profile plus a bearer token for it
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Status and parsed JSON body of one response
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// The `data` field of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(self.status, expected, "unexpected status, body: {}", self.body);
        self
    }
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone());
        let router = routes::app(state.clone());
        Self { store, state, router }
    }

    pub async fn seed_profile(&self, role: Role, name: &str) -> Result<TestUser> {
        let id = Uuid::new_v4();
        let email = format!("{}@example.com", name.to_lowercase());
        Repository::<Profile>::new(self.store.clone())
            .insert(&json!({
                "id": id,
                "email": email,
                "full_name": name,
                "role": role,
                "created_at": Utc::now(),
            }))
            .await?;
        Self::token_for(id, &email)
    }

    /// A valid token for an identity that has no profile row
    pub fn token_for(id: Uuid, email: &str) -> Result<TestUser> {
        let token = generate_jwt(&Claims::new(id, email)).context("failed to mint token")?;
        Ok(TestUser {
            id,
            email: email.to_string(),
            token,
        })
    }

    pub async fn assign(&self, psychiatrist: &TestUser, patient: &TestUser) -> Result<()> {
        Repository::<Assignment>::new(self.store.clone())
            .insert(&json!({ "psychiatrist_id": psychiatrist.id, "patient_id": patient.id }))
            .await?;
        Ok(())
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", user.token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok(TestResponse { status, body })
    }

    /// Start a GET and hand back the response with its body unread
    pub async fn open(&self, uri: &str, user: &TestUser) -> Result<Response> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
            .body(Body::empty())?;
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn get(&self, uri: &str, user: &TestUser) -> Result<TestResponse> {
        self.request(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &TestUser, body: Value) -> Result<TestResponse> {
        self.request(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &TestUser, body: Value) -> Result<TestResponse> {
        self.request(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, user: &TestUser, body: Value) -> Result<TestResponse> {
        self.request(Method::PATCH, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &TestUser) -> Result<TestResponse> {
        self.request(Method::DELETE, uri, Some(user), None).await
    }
}

pub fn routine_body(title: &str, time: &str) -> Value {
    json!({
        "title": title,
        "time": time,
        "category": "health",
        "icon": "sun",
        "color": "green",
    })
}
