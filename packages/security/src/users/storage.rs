// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles account CRUD, credential checks and role changes

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::types::{User, UserCreateInput, UserRecord};
use crate::error::SecurityResult;
use crate::password::{hash_password, verify_password};
use crate::roles::Role;
use plankit_storage::StorageError;

const USER_COLUMNS: &str = "id, email, username, role, password_hash, created_at";

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an account with a hashed password. Duplicate emails are rejected.
    pub async fn create_user(&self, input: UserCreateInput) -> SecurityResult<User> {
        let role: Role = input.role.parse()?;
        let email = input.email.trim().to_lowercase();
        debug!("Creating user: {}", email);

        if self.find_by_email(&email).await?.is_some() {
            return Err(StorageError::Duplicate("Email already registered".to_string()).into());
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email,
            username: input.username,
            role,
            password_hash: hash_password(&input.password)?,
            created_at: Utc::now(),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, username, role, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.email)
        .bind(&record.username)
        .bind(record.role.as_str())
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(record.into()),
            // Lost a race with a concurrent insert of the same email
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StorageError::Duplicate("Email already registered".to_string()).into())
            }
            Err(e) => Err(StorageError::Sqlx(e).into()),
        }
    }

    pub async fn get_user(&self, user_id: &str) -> SecurityResult<Option<User>> {
        debug!("Fetching user: {}", user_id);

        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|row| row_to_record(&row).map(User::from)).transpose()
    }

    pub async fn find_by_email(&self, email: &str) -> SecurityResult<Option<UserRecord>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.map(|row| row_to_record(&row)).transpose()
    }

    /// Look up an account by email and check its password.
    /// Unknown email and wrong password both yield `None`.
    pub async fn authenticate(&self, email: &str, password: &str) -> SecurityResult<Option<User>> {
        let Some(record) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        if verify_password(password, &record.password_hash)? {
            Ok(Some(record.into()))
        } else {
            Ok(None)
        }
    }

    pub async fn list_users(&self) -> SecurityResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at, rowid", USER_COLUMNS);
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter()
            .map(|row| row_to_record(row).map(User::from))
            .collect()
    }

    pub async fn update_role(&self, user_id: &str, role: &str) -> SecurityResult<User> {
        let role: Role = role.parse()?;
        debug!("Setting role of {} to {}", user_id, role);

        let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("User").into());
        }

        self.get_user(user_id)
            .await?
            .ok_or_else(|| StorageError::not_found("User").into())
    }

    pub async fn delete_user(&self, user_id: &str) -> SecurityResult<()> {
        debug!("Deleting user: {}", user_id);

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("User").into());
        }

        Ok(())
    }
}

fn row_to_record(row: &SqliteRow) -> SecurityResult<UserRecord> {
    let role: String = row.try_get("role").map_err(StorageError::Sqlx)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(StorageError::Sqlx)?;

    Ok(UserRecord {
        id: row.try_get("id").map_err(StorageError::Sqlx)?,
        email: row.try_get("email").map_err(StorageError::Sqlx)?,
        username: row.try_get("username").map_err(StorageError::Sqlx)?,
        role: role.parse()?,
        password_hash: row.try_get("password_hash").map_err(StorageError::Sqlx)?,
        created_at,
    })
}
