// ABOUTME: Password hashing with Argon2id
// ABOUTME: Produces PHC strings and verifies submitted passwords against them

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::RngCore;

use crate::error::{SecurityError, SecurityResult};

const SALT_LEN: usize = 16;

/// Hash a password into a PHC string (`$argon2id$v=19$...`)
pub fn hash_password(password: &str) -> SecurityResult<String> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let salt_string = SaltString::encode_b64(&salt)
        .map_err(|e| SecurityError::Hashing(format!("Failed to encode salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt_string)
        .map_err(|e| SecurityError::Hashing(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string.
/// An unparseable stored hash is an error; a wrong password is `Ok(false)`.
pub fn verify_password(password: &str, stored_hash: &str) -> SecurityResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| SecurityError::Hashing(format!("Stored hash is invalid: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
