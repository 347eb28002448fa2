// ABOUTME: Error type for authentication and account operations
// ABOUTME: Separates token failures from storage and hashing faults

use plankit_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Malformed access token")]
    TokenMalformed,

    #[error("Access token signature mismatch")]
    TokenSignature,

    #[error("Access token expired")]
    TokenExpired,

    #[error("Invalid role: {0}")]
    InvalidRole(String),
}

impl SecurityError {
    /// Token problems that should surface as 401 rather than 500
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            SecurityError::TokenMalformed | SecurityError::TokenSignature | SecurityError::TokenExpired
        )
    }
}

pub type SecurityResult<T> = Result<T, SecurityError>;
