//! Password hashing with Argon2id.
//!
//! Hashes are stored in PHC string format, so parameters and salt travel with
//! the hash and verification needs nothing else.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};

use super::AuthError;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored PHC hash.
///
/// A hash that cannot be parsed is treated as a mismatch rather than an error
/// so that a corrupt row cannot be told apart from a wrong password.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
            false
        }
    }
}

/// Hash checked when the username is unknown, so that branch costs one
/// Argon2 verification like a wrong password does.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("lms-unknown-account").unwrap_or_default());

/// Run a verification that always fails, for logins with no matching account.
pub fn verify_against_dummy(password: &str) -> bool {
    verify_password(password, &DUMMY_HASH);
    false
}
