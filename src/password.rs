//! Argon2 password hashing.

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

/// Errors that can occur while hashing a password.
#[derive(Debug)]
pub enum PasswordError {
    /// Salt could not be encoded
    Salt(argon2::password_hash::Error),
    /// Hashing failed
    Hash(argon2::password_hash::Error),
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::Salt(e) => write!(f, "Failed to encode salt: {}", e),
            PasswordError::Hash(e) => write!(f, "Failed to hash password: {}", e),
        }
    }
}

impl std::error::Error for PasswordError {}

/// Hash a password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::rng(), &mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(PasswordError::Salt)?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(PasswordError::Hash)
}

/// Argon2id hash with default parameters, checked in place of a missing account's hash.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dZVLaT8C4wIKHgc1588GUQ$ijNKST9EZ8RtNgQ0ouYDcMYtbx2AfzPsbqywrkKkXbY";

/// Check a password against an account's stored hash.
///
/// Without an account the password is still run through argon2, against a
/// dummy hash, so unknown emails take as long as wrong passwords. That case
/// never matches.
pub fn verify_password_or_dummy(hash: Option<&str>, password: &str) -> bool {
    match hash {
        Some(hash) => verify_password(hash, password),
        None => {
            let _ = verify_password(DUMMY_PASSWORD_HASH, password);
            false
        }
    }
}

/// Check a password against a stored PHC string. Unparsable hashes never match.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
