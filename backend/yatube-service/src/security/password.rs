/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, Result};

/// Hash a password into a PHC string safe for storage.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(hash)
}

/// Verify a password against a stored PHC hash.
///
/// Unparseable hashes (e.g. accounts created without a usable password)
/// never match.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(false),
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("Tolstoy-1828").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Tolstoy-1828", &hash).unwrap());
        assert!(!verify_password("tolstoy-1828", &hash).unwrap());
    }

    #[test]
    fn unusable_hash_never_matches() {
        assert!(!verify_password("anything", "!").unwrap());
    }
}
