//! Password hashing
//!
//! Argon2id with a per-user random salt. The salt is persisted alongside
//! the hash so credentials can be re-derived during verification.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::AppError;

/// Generate a fresh random salt.
pub fn generate_salt() -> SaltString {
    SaltString::generate(&mut OsRng)
}

/// Hash a password with the given salt.
pub fn hash_password(password: &str, salt: &SaltString) -> Result<String, AppError> {
    Argon2::default()
        .hash_password(password.as_bytes(), salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored hash. Malformed hashes verify as
/// false rather than erroring, so login failures stay indistinguishable.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
