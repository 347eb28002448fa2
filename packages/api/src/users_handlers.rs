// ABOUTME: HTTP request handlers for user administration
// ABOUTME: Admin-only account creation, listing, role changes and removal

use axum::{
    extract::{Path, State},
    Json,
};
use plankit_security::{User, UserCreateInput};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::AdminUser;
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: String,
}

fn validate_new_user(input: &UserCreateInput) -> ApiResult<()> {
    let email = input.email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(AppError::validation("A valid email address is required"));
    }
    if input.username.trim().is_empty() {
        return Err(AppError::validation("Username cannot be empty"));
    }
    if input.password.is_empty() {
        return Err(AppError::validation("Password cannot be empty"));
    }
    Ok(())
}

pub async fn create_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<UserCreateInput>,
) -> ApiResult<Json<User>> {
    info!("Admin {} creating user {}", admin.id, input.email);

    validate_new_user(&input)?;
    let user = state.user_storage.create_user(input).await?;
    Ok(Json(user))
}

pub async fn list_users(
    AdminUser(_): AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<User>>> {
    info!("Listing users");

    Ok(Json(state.user_storage.list_users().await?))
}

pub async fn update_user_role(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<RoleUpdateRequest>,
) -> ApiResult<Json<User>> {
    info!("Admin {} setting role of {} to {}", admin.id, user_id, request.role);

    let user = state.user_storage.update_role(&user_id, &request.role).await?;
    Ok(Json(user))
}

pub async fn delete_user(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    info!("Admin {} deleting user {}", admin.id, user_id);

    if user_id == admin.id {
        return Err(AppError::conflict("Cannot delete your own account"));
    }

    state.user_storage.delete_user(&user_id).await?;
    Ok(Json(json!({"message": "User deleted successfully"})))
}
