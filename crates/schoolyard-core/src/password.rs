use anyhow::Context;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .context("Could not create user, please try again.")
        .map_err(AppError::internal)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .context("Could not log you in, please check your credentials and try again.")
        .map_err(AppError::internal)
}

/// PINs are compared case-insensitively.
pub fn pin_matches(candidate: &str, stored: &str) -> bool {
    candidate.to_lowercase() == stored.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("correct horse").unwrap();
        assert_ne!(hashed, "correct horse");
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("battery staple", &hashed).unwrap());
    }

    #[test]
    fn test_verify_against_garbage_hash_fails() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_pin_matches_ignores_case() {
        assert!(pin_matches("ab12Cd", "AB12cd"));
        assert!(!pin_matches("ab12cd", "ab12ce"));
        assert!(!pin_matches("", "x"));
    }
}
