// ABOUTME: Authentication and account management for PlanKit
// ABOUTME: Provides roles, password hashing, access tokens and user storage

pub mod error;
pub mod password;
pub mod roles;
pub mod seed;
pub mod tokens;
pub mod users;

// Re-export main types for convenience
pub use error::{SecurityError, SecurityResult};
pub use password::{hash_password, verify_password};
pub use roles::Role;
pub use seed::{seed_default_users, DEFAULT_ACCOUNTS};
pub use tokens::{Claims, TokenService};
pub use users::{User, UserCreateInput, UserRecord, UserStorage};
