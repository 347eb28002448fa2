// ABOUTME: Server bootstrap for PlanKit
// ABOUTME: Opens the database, prepares tables and accounts, then serves the API until shutdown

use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::Router;
use plankit_api::{create_app, AppState};
use plankit_security::{seed_default_users, TokenService};
use plankit_storage::{connect, ensure_tables, run_migrations, SchemaRegistry};
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info};

pub mod config;

#[cfg(test)]
mod tests;

pub use config::{Config, ConfigError};

/// Install the global tracing subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}

/// Open the pool, apply migrations and create every registered content table
pub async fn prepare_database(config: &Config) -> anyhow::Result<(SqlitePool, Arc<SchemaRegistry>)> {
    let pool = connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    run_migrations(&pool).await.context("failed to run migrations")?;

    let registry = Arc::new(SchemaRegistry::builtin().context("invalid schema registry")?);
    ensure_tables(&pool, &registry)
        .await
        .context("failed to create content tables")?;
    info!(
        "Database ready: {} section tables registered",
        registry.section_count()
    );

    Ok((pool, registry))
}

pub fn build_cors(config: &Config) -> anyhow::Result<CorsLayer> {
    let origin = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS origin: {}", origin))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any))
}

/// The API router with CORS applied
pub fn build_app(state: AppState, config: &Config) -> anyhow::Result<Router> {
    Ok(create_app(state).layer(build_cors(config)?))
}

/// Run migrations and table creation, then exit
pub async fn run_migrations_only(config: &Config) -> anyhow::Result<()> {
    let (pool, _) = prepare_database(config).await?;
    pool.close().await;
    info!("Migrations complete");
    Ok(())
}

pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let (pool, registry) = prepare_database(&config).await?;

    let tokens = TokenService::new(&config.secret_key, config.token_ttl());
    let state = AppState::new(pool.clone(), registry, tokens);

    if config.seed_default_users {
        let created = seed_default_users(&state.user_storage)
            .await
            .context("failed to seed default users")?;
        if created > 0 {
            info!("Created {} default accounts", created);
        }
    }

    let app = build_app(state, &config)?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("PlanKit API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
