use std::sync::LazyLock;

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::service::AuthError;

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("failed to hash password: {}", e)))
}

/// Verify a password against an argon2id hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

const DUMMY_PASSWORD: &str = "tollgate-dummy-password";

/// Hashed once with the same parameters as real accounts.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| hash_password(DUMMY_PASSWORD).ok());

/// Verify against `hash`, or against a dummy hash when there is none, so a
/// missing account costs the same argon2 work as a wrong password.
pub fn verify_password_or_dummy(password: &str, hash: Option<&str>) -> bool {
    match hash {
        Some(hash) => verify_password(password, hash),
        None => {
            if let Some(dummy) = DUMMY_HASH.as_deref() {
                verify_password(password, dummy);
            }
            false
        }
    }
}
