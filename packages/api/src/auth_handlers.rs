// ABOUTME: HTTP request handlers for login and the current session
// ABOUTME: Exchanges credentials for a bearer token and reports the caller's profile

use axum::{extract::State, Json};
use plankit_security::User;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    info!("Login attempt for {}", request.email);

    let Some(user) = state
        .user_storage
        .authenticate(&request.email, &request.password)
        .await?
    else {
        warn!("Failed login for {}", request.email);
        return Err(AppError::unauthorized("Incorrect email or password"));
    };

    let access_token = state.tokens.issue(&user.id)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
