// ABOUTME: Shared state handed to every API handler
// ABOUTME: Holds the pool, the schema registry, storage layers and the token service

use std::sync::Arc;

use plankit_security::{TokenService, UserStorage};
use plankit_storage::{ProjectStorage, RowStorage, SchemaRegistry};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub registry: Arc<SchemaRegistry>,
    pub rows: Arc<RowStorage>,
    pub project_storage: Arc<ProjectStorage>,
    pub user_storage: Arc<UserStorage>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, registry: Arc<SchemaRegistry>, tokens: TokenService) -> Self {
        Self {
            rows: Arc::new(RowStorage::new(pool.clone())),
            project_storage: Arc::new(ProjectStorage::new(pool.clone())),
            user_storage: Arc::new(UserStorage::new(pool.clone())),
            tokens: Arc::new(tokens),
            registry,
            pool,
        }
    }
}
