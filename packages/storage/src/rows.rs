// ABOUTME: Generic project-scoped CRUD over any registered content table
// ABOUTME: Builds parameterized SQL from a TableSchema and maps rows back to JSON values

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::codec::{RowValues, StoredRow};
use crate::error::{StorageError, StorageResult};
use crate::schema::{quote, ColumnDef, ColumnKind, TableSchema};

/// Row storage shared by every named resource and section table.
///
/// SQL injection safety: table and column identifiers come from a
/// `TableSchema`, which only admits `[a-z0-9_]` names, and are always quoted.
/// Every value goes through `push_bind()` / `bind()`.
pub struct RowStorage {
    pool: SqlitePool,
}

impl RowStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a row with a fresh id. Order columns get `max + 1` for the project.
    pub async fn create(
        &self,
        schema: &TableSchema,
        project_id: &str,
        values: &RowValues,
    ) -> StorageResult<StoredRow> {
        let id = Uuid::new_v4().to_string();
        debug!("Creating row {} in {}", id, schema.table_name());

        let mut tx = begin_write(&self.pool).await?;

        let mut values = values.clone();
        if let Some(order_column) = schema.order_column() {
            let next = next_order(&mut tx, schema, order_column, project_id).await?;
            values.insert(order_column.name.to_string(), Value::from(next));
        }

        insert_row(&mut tx, schema, &id, project_id, &values).await?;
        let row = fetch_scoped(&mut tx, schema, project_id, &id)
            .await?
            .ok_or_else(|| StorageError::Database(format!("row {} vanished after insert", id)))?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(row)
    }

    /// All rows of a project, ordered by the order column when the table has one
    pub async fn list(&self, schema: &TableSchema, project_id: &str) -> StorageResult<Vec<StoredRow>> {
        debug!("Listing {} for project {}", schema.table_name(), project_id);

        let mut builder = select_builder(schema);
        builder.push(" WHERE project_id = ");
        builder.push_bind(project_id.to_string());
        push_ordering(&mut builder, schema);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(|row| read_row(schema, row)).collect()
    }

    pub async fn get(
        &self,
        schema: &TableSchema,
        project_id: &str,
        id: &str,
    ) -> StorageResult<StoredRow> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        fetch_scoped(&mut conn, schema, project_id, id)
            .await?
            .ok_or_else(|| StorageError::not_found("Item"))
    }

    /// First row of a project in insertion order, if any
    pub async fn find_first(
        &self,
        schema: &TableSchema,
        project_id: &str,
    ) -> StorageResult<Option<StoredRow>> {
        let mut builder = select_builder(schema);
        builder.push(" WHERE project_id = ");
        builder.push_bind(project_id.to_string());
        builder.push(" ORDER BY rowid LIMIT 1");

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|row| read_row(schema, &row)).transpose()
    }

    /// Row of a project whose `column` equals `value`
    pub async fn find_by(
        &self,
        schema: &TableSchema,
        project_id: &str,
        column: &str,
        value: &str,
    ) -> StorageResult<Option<StoredRow>> {
        let mut conn = self.pool.acquire().await.map_err(StorageError::Sqlx)?;
        fetch_by_column(&mut conn, schema, project_id, column, value).await
    }

    /// Overwrite every writable column of an existing row. Order columns are kept.
    pub async fn update(
        &self,
        schema: &TableSchema,
        project_id: &str,
        id: &str,
        values: &RowValues,
    ) -> StorageResult<StoredRow> {
        debug!("Updating row {} in {}", id, schema.table_name());

        let mut tx = begin_write(&self.pool).await?;

        if fetch_scoped(&mut tx, schema, project_id, id).await?.is_none() {
            return Err(StorageError::not_found("Item"));
        }

        update_row(&mut tx, schema, project_id, id, values).await?;
        let row = fetch_scoped(&mut tx, schema, project_id, id)
            .await?
            .ok_or_else(|| StorageError::not_found("Item"))?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(row)
    }

    pub async fn delete(&self, schema: &TableSchema, project_id: &str, id: &str) -> StorageResult<()> {
        debug!("Deleting row {} from {}", id, schema.table_name());

        let sql = format!(
            "DELETE FROM {} WHERE id = ? AND project_id = ?",
            quote(schema.table_name())
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(project_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Item"));
        }

        Ok(())
    }

    /// Create-or-update keyed by `(project_id, key_column)`.
    /// At most one row exists per key afterwards.
    pub async fn upsert_by(
        &self,
        schema: &TableSchema,
        project_id: &str,
        key_column: &str,
        values: &RowValues,
    ) -> StorageResult<StoredRow> {
        let key = values
            .get(key_column)
            .and_then(Value::as_str)
            .ok_or_else(|| StorageError::invalid_input(format!("'{}' is required", key_column)))?
            .to_string();

        debug!("Upserting {}={} in {}", key_column, key, schema.table_name());

        let mut tx = begin_write(&self.pool).await?;

        let id = match fetch_by_column(&mut tx, schema, project_id, key_column, &key).await? {
            Some(existing) => {
                update_row(&mut tx, schema, project_id, &existing.id, values).await?;
                existing.id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                insert_row(&mut tx, schema, &id, project_id, values).await?;
                id
            }
        };

        let row = fetch_scoped(&mut tx, schema, project_id, &id)
            .await?
            .ok_or_else(|| StorageError::not_found("Item"))?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(row)
    }

    /// Delete the rows of a project whose `column` equals `value`
    pub async fn delete_by(
        &self,
        schema: &TableSchema,
        project_id: &str,
        column: &str,
        value: &str,
    ) -> StorageResult<()> {
        let column = checked_column(schema, column)?;
        debug!("Deleting {}={} from {}", column.name, value, schema.table_name());

        let sql = format!(
            "DELETE FROM {} WHERE project_id = ? AND {} = ?",
            quote(schema.table_name()),
            quote(column.name)
        );
        let result = sqlx::query(&sql)
            .bind(project_id)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Item"));
        }

        Ok(())
    }
}

/// Open a transaction holding the write lock from the start.
/// A deferred read-then-write fails with SQLITE_BUSY_SNAPSHOT when another
/// writer commits in between; `BEGIN IMMEDIATE` waits on the busy timeout instead.
pub(crate) async fn begin_write(pool: &SqlitePool) -> StorageResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(StorageError::Sqlx)
}

/// Remove every row of `project_id` from `schema`'s table, returning the count
pub(crate) async fn sweep_project(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    project_id: &str,
) -> StorageResult<u64> {
    let sql = format!(
        "DELETE FROM {} WHERE project_id = ?",
        quote(schema.table_name())
    );
    let result = sqlx::query(&sql)
        .bind(project_id)
        .execute(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(result.rows_affected())
}

fn checked_column<'s>(schema: &'s TableSchema, column: &str) -> StorageResult<&'s ColumnDef> {
    schema.column(column).ok_or_else(|| {
        StorageError::invalid_input(format!(
            "'{}' is not a column of {}",
            column,
            schema.table_name()
        ))
    })
}

fn select_builder(schema: &TableSchema) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new("SELECT id, project_id");
    for column in schema.columns() {
        builder.push(", ");
        builder.push(quote(column.name));
    }
    builder.push(" FROM ");
    builder.push(quote(schema.table_name()));
    builder
}

fn push_ordering(builder: &mut QueryBuilder<'static, Sqlite>, schema: &TableSchema) {
    match schema.order_column() {
        Some(column) => {
            builder.push(" ORDER BY ");
            builder.push(quote(column.name));
            builder.push(" ASC, rowid ASC");
        }
        None => {
            builder.push(" ORDER BY rowid ASC");
        }
    }
}

fn push_value(
    builder: &mut QueryBuilder<'static, Sqlite>,
    column: &ColumnDef,
    value: Option<&Value>,
) -> StorageResult<()> {
    match column.kind {
        ColumnKind::Text => {
            builder.push_bind(value.and_then(Value::as_str).map(str::to_owned));
        }
        ColumnKind::Order => {
            builder.push_bind(value.and_then(Value::as_i64).unwrap_or(0));
        }
        ColumnKind::JsonObject => {
            let text = match value {
                Some(v @ Value::Object(_)) => serde_json::to_string(v)?,
                _ => "{}".to_string(),
            };
            builder.push_bind(text);
        }
    }
    Ok(())
}

async fn next_order(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    order_column: &ColumnDef,
    project_id: &str,
) -> StorageResult<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX({}), 0) + 1 FROM {} WHERE project_id = ?",
        quote(order_column.name),
        quote(schema.table_name())
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(project_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)
}

async fn insert_row(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    id: &str,
    project_id: &str,
    values: &RowValues,
) -> StorageResult<()> {
    let mut builder = QueryBuilder::new("INSERT INTO ");
    builder.push(quote(schema.table_name()));
    builder.push(" (id, project_id");
    for column in schema.columns() {
        builder.push(", ");
        builder.push(quote(column.name));
    }
    builder.push(") VALUES (");
    builder.push_bind(id.to_string());
    builder.push(", ");
    builder.push_bind(project_id.to_string());
    for column in schema.columns() {
        builder.push(", ");
        push_value(&mut builder, column, values.get(column.name))?;
    }
    builder.push(")");

    builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(())
}

async fn update_row(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    project_id: &str,
    id: &str,
    values: &RowValues,
) -> StorageResult<()> {
    let mut builder = QueryBuilder::new("UPDATE ");
    builder.push(quote(schema.table_name()));
    builder.push(" SET ");
    for (i, column) in schema.writable_columns().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push(quote(column.name));
        builder.push(" = ");
        push_value(&mut builder, column, values.get(column.name))?;
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id.to_string());
    builder.push(" AND project_id = ");
    builder.push_bind(project_id.to_string());

    builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(())
}

async fn fetch_scoped(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    project_id: &str,
    id: &str,
) -> StorageResult<Option<StoredRow>> {
    let mut builder = select_builder(schema);
    builder.push(" WHERE id = ");
    builder.push_bind(id.to_string());
    builder.push(" AND project_id = ");
    builder.push_bind(project_id.to_string());

    let row = builder
        .build()
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    row.map(|row| read_row(schema, &row)).transpose()
}

async fn fetch_by_column(
    conn: &mut SqliteConnection,
    schema: &TableSchema,
    project_id: &str,
    column: &str,
    value: &str,
) -> StorageResult<Option<StoredRow>> {
    let column = checked_column(schema, column)?;

    let mut builder = select_builder(schema);
    builder.push(" WHERE project_id = ");
    builder.push_bind(project_id.to_string());
    builder.push(" AND ");
    builder.push(quote(column.name));
    builder.push(" = ");
    builder.push_bind(value.to_string());
    builder.push(" ORDER BY rowid LIMIT 1");

    let row = builder
        .build()
        .fetch_optional(&mut *conn)
        .await
        .map_err(StorageError::Sqlx)?;

    row.map(|row| read_row(schema, &row)).transpose()
}

fn read_row(schema: &TableSchema, row: &SqliteRow) -> StorageResult<StoredRow> {
    let mut values = Map::with_capacity(schema.columns().len());

    for column in schema.columns() {
        let value = match column.kind {
            ColumnKind::Text => row
                .try_get::<Option<String>, _>(column.name)
                .map_err(StorageError::Sqlx)?
                .map(Value::String)
                .unwrap_or(Value::Null),
            ColumnKind::Order => Value::from(
                row.try_get::<i64, _>(column.name)
                    .map_err(StorageError::Sqlx)?,
            ),
            ColumnKind::JsonObject => {
                match row
                    .try_get::<Option<String>, _>(column.name)
                    .map_err(StorageError::Sqlx)?
                {
                    Some(text) => serde_json::from_str(&text)?,
                    None => Value::Object(Map::new()),
                }
            }
        };
        values.insert(column.name.to_string(), value);
    }

    Ok(StoredRow {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        project_id: row.try_get("project_id").map_err(StorageError::Sqlx)?,
        values,
    })
}
