// Password hashing and verification service

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::sync::OnceLock;

use crate::auth::error::AuthError;

/// Password service for hashing and verification
///
/// Argon2id with the crate's default (fixed) cost parameters and a fresh
/// random salt per hash. Output is a self-describing PHC string.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHashError(e.to_string()))
    }

    /// Verify a password against a stored hash
    ///
    /// A mismatch is `Ok(false)`; only an unparseable stored hash is an error.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AuthError::PasswordHashError(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHashError(e.to_string())),
        }
    }

    /// Run a full verification against a throwaway hash
    ///
    /// Used when no account matches, so that path costs the same as a wrong
    /// password. Always false.
    pub fn verify_dummy(password: &str) -> bool {
        static DUMMY_HASH: OnceLock<String> = OnceLock::new();
        let hash = DUMMY_HASH.get_or_init(|| {
            Self::hash_password("no-such-account").unwrap_or_default()
        });

        let _ = Self::verify_password(password, hash);
        false
    }
}
