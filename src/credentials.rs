//! Credential service
//!
//! Argon2id password hashing and verification. The rest of the system
//! treats hashes as opaque strings: they are produced here at user
//! creation and checked here when a user is fetched with a password.
//! Plaintext passwords never reach the store.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::types::LedgerError;

/// Hash a plaintext password into a PHC string
///
/// A fresh random salt is drawn per call, so hashing the same password
/// twice yields different strings.
///
/// # Errors
///
/// Returns `Hashing` if the backend rejects the input.
pub fn hash_password(password: &str) -> Result<String, LedgerError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| LedgerError::Hashing {
            message: e.to_string(),
        })?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC string
///
/// # Errors
///
/// Returns `Credential` on mismatch, or `Hashing` if the stored string is
/// not a parseable hash.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), LedgerError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| LedgerError::Hashing {
        message: e.to_string(),
    })?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| LedgerError::Credential)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_is_credential_error() {
        let hash = hash_password("hunter2").unwrap();
        let err = verify_password("hunter3", &hash).unwrap_err();
        assert!(matches!(err, LedgerError::Credential));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_stored_hash_is_hashing_error() {
        let err = verify_password("hunter2", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, LedgerError::Hashing { .. }));
    }
}
