//! Password hashing utilities using Argon2id.
//!
//! Digests are stored in PHC string format so the parameters travel with the
//! hash and verification keeps working if the parameters below change.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::sync::OnceLock;
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Argon2id parameters (OWASP 2024): 19 MiB, 2 iterations, 1 lane.
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id with a fresh random salt.
///
/// # Arguments
/// * `password` - The plaintext password to hash
///
/// # Returns
/// * `Ok(String)` - PHC-formatted digest
/// * `Err(PasswordError)` - If hashing fails
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let digest = hash_password("Str0ngPassword").unwrap();
/// assert!(digest.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = create_argon2()?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored digest in constant time.
///
/// # Returns
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(PasswordError)` - If the digest cannot be parsed
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(|_| PasswordError::InvalidHashFormat)?;

    // The digest carries its own parameters.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Burns the same amount of work as a real verification when no account
/// matched, so login latency does not reveal whether an email is registered.
///
/// Always returns `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    static DUMMY_DIGEST: OnceLock<Option<String>> = OnceLock::new();

    let digest = DUMMY_DIGEST.get_or_init(|| hash_password("dummy-password-for-timing").ok());
    if let Some(digest) = digest {
        let _ = verify_password(password, digest);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_uses_configured_params() {
        let digest = hash_password("StrongP@ss1").unwrap();
        assert!(digest.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_hash_password_salts_each_call() {
        let a = hash_password("same_password1").unwrap();
        let b = hash_password("same_password1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password_round_trip() {
        let digest = hash_password("StrongP@ss1").unwrap();
        assert!(verify_password("StrongP@ss1", &digest).unwrap());
        assert!(!verify_password("StrongP@ss2", &digest).unwrap());
    }

    #[test]
    fn test_verify_password_is_case_sensitive() {
        let digest = hash_password("Password1").unwrap();
        assert!(!verify_password("password1", &digest).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_digest() {
        let result = verify_password("password", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_verify_password_unicode() {
        let digest = hash_password("пароль123").unwrap();
        assert!(verify_password("пароль123", &digest).unwrap());
    }

    #[test]
    fn test_verify_against_dummy_never_matches() {
        assert!(!verify_against_dummy("dummy-password-for-timing"));
        assert!(!verify_against_dummy("anything"));
    }
}
