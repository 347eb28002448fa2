use crate::{build_app, build_cors, prepare_database, Config};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use plankit_api::AppState;
use plankit_security::{seed_default_users, TokenService};
use std::net::{IpAddr, Ipv4Addr};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_config(database_url: String, cors_origins: &[&str]) -> Config {
    Config {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 8001,
        database_url,
        max_connections: 2,
        secret_key: "test-secret".to_string(),
        access_token_expire_minutes: 60,
        cors_origins: cors_origins.iter().map(|s| s.to_string()).collect(),
        seed_default_users: true,
    }
}

#[test]
fn test_invalid_cors_origin_rejected() {
    let config = test_config("sqlite::memory:".to_string(), &["bad\norigin"]);
    assert!(build_cors(&config).is_err());
}

#[tokio::test]
async fn test_prepare_database_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("plankit.db").display());
    let config = test_config(url, &["*"]);

    let (pool, registry) = prepare_database(&config).await.unwrap();
    pool.close().await;

    let (pool, _) = prepare_database(&config).await.unwrap();
    let state = AppState::new(
        pool.clone(),
        registry,
        TokenService::new("test-secret", config.token_ttl()),
    );
    assert_eq!(seed_default_users(&state.user_storage).await.unwrap(), 3);
    assert_eq!(seed_default_users(&state.user_storage).await.unwrap(), 0);

    pool.close().await;
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let dir = TempDir::new().unwrap();
    let url = format!("sqlite:{}", dir.path().join("plankit.db").display());
    let config = test_config(url, &["https://app.example.com"]);

    let (pool, registry) = prepare_database(&config).await.unwrap();
    let state = AppState::new(
        pool.clone(),
        registry,
        TokenService::new("test-secret", config.token_ttl()),
    );
    let app = build_app(state, &config).unwrap();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/projects")
        .header(header::ORIGIN, "https://app.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    pool.close().await;
}
