// ABOUTME: Authentication and role checks for API requests
// ABOUTME: Extracts the bearer token, verifies it and loads the user on every request

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use plankit_security::{Role, User};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Current authenticated user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Authenticated user holding at least the editor role
#[derive(Debug, Clone)]
pub struct EditorUser(pub User);

/// Authenticated user holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::unauthorized("Not authenticated"))?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AppError::unauthorized("Not authenticated"));
    }

    Ok(token.trim())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = state.tokens.verify(token).map_err(|e| {
            warn!(error = %e, "Rejected access token");
            AppError::Security(e)
        })?;

        match state.user_storage.get_user(&claims.sub).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!(user_id = %claims.sub, "Token subject no longer exists");
                Err(AppError::unauthorized("User not found"))
            }
        }
    }
}

async fn require_role(
    parts: &mut Parts,
    state: &AppState,
    required: Role,
    message: &str,
) -> Result<User, AppError> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

    if !user.role.satisfies(required) {
        warn!(user_id = %user.id, role = %user.role, required = %required, "Insufficient role");
        return Err(AppError::forbidden(message));
    }

    Ok(user)
}

impl FromRequestParts<AppState> for EditorUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Editor, "Editor access required")
            .await
            .map(EditorUser)
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin, "Admin access required")
            .await
            .map(AdminUser)
    }
}
