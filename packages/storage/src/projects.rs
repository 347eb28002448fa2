// ABOUTME: Project storage and the project deletion cascade
// ABOUTME: Deleting a project sweeps every registered content table in one transaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::registry::SchemaRegistry;
use crate::rows::{begin_write, sweep_project};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCreateInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct ProjectStorage {
    pool: SqlitePool,
}

impl ProjectStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_project(
        &self,
        input: ProjectCreateInput,
        created_by: &str,
    ) -> StorageResult<Project> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StorageError::invalid_input("Project name cannot be empty"));
        }

        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: input.description,
            created_by: created_by.to_string(),
            created_at: Utc::now(),
        };

        debug!("Creating project {} ({})", project.name, project.id);

        sqlx::query(
            r#"
            INSERT INTO projects (id, name, description, created_by, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.created_by)
        .bind(project.created_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(project)
    }

    pub async fn list_projects(&self) -> StorageResult<Vec<Project>> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_by, created_at FROM projects ORDER BY created_at, rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Sqlx)
    }

    pub async fn get_project(&self, project_id: &str) -> StorageResult<Project> {
        sqlx::query_as::<_, Project>(
            "SELECT id, name, description, created_by, created_at FROM projects WHERE id = ?",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?
        .ok_or_else(|| StorageError::not_found("Project"))
    }

    /// Delete a project and every content row that references it.
    ///
    /// The project row goes first (`NotFound` if absent), then each table the
    /// registry knows about is swept by `project_id`. All of it commits or
    /// none of it does.
    pub async fn delete_with_content(
        &self,
        project_id: &str,
        registry: &SchemaRegistry,
    ) -> StorageResult<u64> {
        let mut tx = begin_write(&self.pool).await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        if deleted.rows_affected() == 0 {
            return Err(StorageError::not_found("Project"));
        }

        let mut swept = 0;
        for schema in registry.all_tables() {
            swept += sweep_project(&mut tx, schema, project_id).await?;
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        info!(
            "Deleted project {} and {} content rows",
            project_id, swept
        );

        Ok(swept)
    }
}
