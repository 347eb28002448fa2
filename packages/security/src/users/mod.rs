// ABOUTME: User account module
// ABOUTME: Provides account types and their SQLite storage

pub mod storage;
pub mod types;

pub use storage::UserStorage;
pub use types::*;
