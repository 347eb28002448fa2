use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use plankit_security::SecurityError;
use plankit_storage::StorageError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Main application error type that all handlers should return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Request conflicts with current state (duplicate email, self-delete)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error")]
    Storage(#[from] StorageError),

    #[error("Security error")]
    Security(#[from] SecurityError),
}

/// Error body shared by handler errors and recovered panics:
/// `{success: false, error: {code, message}, request_id}`
#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
    pub(crate) request_id: String,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl ErrorResponse {
    /// New body with a fresh request id
    pub(crate) fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub(crate) fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl AppError {
    /// Convert AppError to appropriate HTTP status code and error code
    fn to_status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            AppError::Storage(storage_error) => storage_status(storage_error),
            AppError::Security(security_error) => match security_error {
                SecurityError::Storage(storage_error) => storage_status(storage_error),
                SecurityError::InvalidRole(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                e if e.is_token_error() => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }

    /// Get user-friendly error message (sanitized for external consumption)
    fn to_user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized { message } => message.clone(),
            AppError::Forbidden { message } => message.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Storage(storage_error) => storage_message(storage_error),
            AppError::Security(security_error) => match security_error {
                SecurityError::Storage(storage_error) => storage_message(storage_error),
                SecurityError::InvalidRole(role) => format!("Invalid role: {}", role),
                SecurityError::TokenExpired => "Token has expired".to_string(),
                SecurityError::TokenMalformed | SecurityError::TokenSignature => {
                    "Could not validate credentials".to_string()
                }
                SecurityError::Hashing(_) => "An internal server error occurred".to_string(),
            },
        }
    }

    fn is_internal(&self) -> bool {
        self.to_status_and_code().0 == StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn storage_status(error: &StorageError) -> (StatusCode, &'static str) {
    match error {
        StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        StorageError::Duplicate(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
        StorageError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    }
}

fn storage_message(error: &StorageError) -> String {
    match error {
        StorageError::NotFound(resource) => format!("{} not found", resource),
        StorageError::Duplicate(msg) | StorageError::InvalidInput(msg) => msg.clone(),
        _ => "Data storage error".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_code) = self.to_status_and_code();
        let body = ErrorResponse::new(error_code, self.to_user_message());
        let request_id = body.request_id.clone();

        // Log internal errors with full context but don't expose details
        if self.is_internal() {
            let detail = match &self {
                AppError::Storage(e) => e.to_string(),
                AppError::Security(e) => e.to_string(),
                other => other.to_string(),
            };
            error!(
                request_id = %request_id,
                error_code = %error_code,
                error = %detail,
                "Internal server error occurred"
            );
        } else {
            tracing::info!(
                request_id = %request_id,
                error_code = %error_code,
                error = %self,
                "API error response"
            );
        }

        body.into_response_with(status_code)
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(AppError::unauthorized("no"), StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(AppError::forbidden("no"), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[case(AppError::conflict("self"), StatusCode::BAD_REQUEST, "CONFLICT")]
    #[case(
        AppError::Storage(StorageError::not_found("Item")),
        StatusCode::NOT_FOUND,
        "NOT_FOUND"
    )]
    #[case(
        AppError::Storage(StorageError::invalid_input("'risk_id' is required")),
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR"
    )]
    #[case(
        AppError::Storage(StorageError::Database("locked".into())),
        StatusCode::INTERNAL_SERVER_ERROR,
        "STORAGE_ERROR"
    )]
    #[case(
        AppError::Security(SecurityError::TokenExpired),
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED"
    )]
    #[case(
        AppError::Security(SecurityError::InvalidRole("root".into())),
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR"
    )]
    #[case(
        AppError::Security(SecurityError::Storage(StorageError::Duplicate("Email already registered".into()))),
        StatusCode::BAD_REQUEST,
        "CONFLICT"
    )]
    fn test_status_mapping(
        #[case] error: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        assert_eq!(error.to_status_and_code(), (status, code));
    }

    #[test]
    fn test_user_message_sanitization() {
        let hashing_error =
            AppError::Security(SecurityError::Hashing("argon2 params for password xyz".into()));
        assert_eq!(hashing_error.to_status_and_code().1, "INTERNAL_ERROR");
        let message = hashing_error.to_user_message();
        assert_eq!(message, "An internal server error occurred");
        assert!(!message.contains("xyz"));

        let storage_error = AppError::Storage(StorageError::Database("disk I/O at /var/db".into()));
        assert_eq!(storage_error.to_user_message(), "Data storage error");
    }

    #[test]
    fn test_not_found_message_names_resource() {
        assert_eq!(
            AppError::Storage(StorageError::not_found("Table")).to_user_message(),
            "Table not found"
        );
    }
}
