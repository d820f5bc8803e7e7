//! Password hashing capability.
//!
//! The domain treats hashes as opaque strings: the entity never stores or
//! reasons about plaintext, and strength policy lives in [`crate::domain::identity`].
//! This module only defines the hashing contract and its Argon2 default.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// One-way hashing contract consumed by the account service.
///
/// `verify` must be deterministic for the same inputs; hashing is one-way.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into an opaque storable string
    fn hash(&self, plaintext: &str) -> AppResult<String>;

    /// Verify a plaintext password against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> bool;
}

/// Default [`PasswordHasher`] backed by Argon2 with library defaults.
#[derive(Clone, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("CorrectHorse9!Battery").unwrap();

        assert!(hasher.verify("CorrectHorse9!Battery", &hash));
        assert!(!hasher.verify("WrongHorse9!Battery", &hash));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let hasher = Argon2Hasher;
        let first = hasher.hash("SamePassword123!").unwrap();
        let second = hasher.hash("SamePassword123!").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("SamePassword123!", &first));
        assert!(hasher.verify("SamePassword123!", &second));
    }

    #[test]
    fn verify_tolerates_malformed_stored_hash() {
        let hasher = Argon2Hasher;
        assert!(!hasher.verify("anything", "not-a-phc-string"));
    }
}
