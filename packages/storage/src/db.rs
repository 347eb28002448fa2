// ABOUTME: Database connection management and schema initialization
// ABOUTME: Opens the SQLite pool, runs embedded migrations and creates content tables

use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::registry::SchemaRegistry;

/// Fixed tables (users, projects)
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a pool against `database_url`, creating the database file if needed
pub async fn connect(database_url: &str, max_connections: u32) -> StorageResult<SqlitePool> {
    debug!("Connecting to database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(StorageError::Sqlx)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .map_err(StorageError::Sqlx)?;

    info!("Database connection established");

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    MIGRATOR.run(pool).await.map_err(StorageError::Migration)?;
    debug!("Database migrations completed");
    Ok(())
}

/// Create every named and section table (plus its project index) if missing.
/// Safe to run on every start.
pub async fn ensure_tables(pool: &SqlitePool, registry: &SchemaRegistry) -> StorageResult<()> {
    let mut tx = pool.begin().await.map_err(StorageError::Sqlx)?;
    let mut count = 0;

    for schema in registry.all_tables() {
        sqlx::query(&schema.create_table_sql())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;
        sqlx::query(&schema.create_index_sql())
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;
        count += 1;
    }

    tx.commit().await.map_err(StorageError::Sqlx)?;

    info!("Content tables ready ({} tables)", count);
    Ok(())
}
