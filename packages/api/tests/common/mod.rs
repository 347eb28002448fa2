// ABOUTME: Shared fixtures for HTTP tests against an in-memory database
// ABOUTME: Builds the full router with seeded accounts and issues tokens per role

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use http_body_util::BodyExt;
use plankit_api::{create_app, AppState};
use plankit_security::{seed_default_users, TokenService};
use plankit_storage::{ensure_tables, SchemaRegistry, MIGRATOR};
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@plankit.com";
pub const EDITOR_EMAIL: &str = "editor@plankit.com";
pub const VIEWER_EMAIL: &str = "viewer@plankit.com";

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();

        let registry = Arc::new(SchemaRegistry::builtin().unwrap());
        ensure_tables(&pool, &registry).await.unwrap();

        let state = AppState::new(
            pool,
            registry,
            TokenService::new("test-secret", Duration::minutes(60)),
        );
        seed_default_users(&state.user_storage).await.unwrap();

        Self {
            app: create_app(state.clone()),
            state,
        }
    }

    pub async fn user_id(&self, email: &str) -> String {
        self.state
            .user_storage
            .find_by_email(email)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    pub async fn token_for(&self, email: &str) -> String {
        let user_id = self.user_id(email).await;
        self.state.tokens.issue(&user_id).unwrap()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL).await
    }

    pub async fn editor_token(&self) -> String {
        self.token_for(EDITOR_EMAIL).await
    }

    pub async fn viewer_token(&self) -> String {
        self.token_for(VIEWER_EMAIL).await
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Create a project as the editor and return its id
    pub async fn create_project(&self, name: &str) -> String {
        let token = self.editor_token().await;
        let (status, body) = self
            .post("/api/projects", &token, serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}
