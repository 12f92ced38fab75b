/// Password Hashing and Verification
///
/// bcrypt with a cost fixed at startup. Strength rules live in `validators`;
/// this module only ever sees passwords that already passed them.

use bcrypt::{hash, verify};

use crate::configuration::PasswordSettings;
use crate::error::AppError;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_settings(settings: &PasswordSettings) -> Self {
        Self::new(settings.hash_cost)
    }

    /// Hash a password using bcrypt with a random salt
    ///
    /// # Errors
    /// Returns `AppError::Internal` if bcrypt rejects the cost or fails
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against its hash
    ///
    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        verify(password, password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::from_settings(&PasswordSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        // lowest cost bcrypt accepts
        PasswordHasher::new(4)
    }

    #[test]
    fn test_hash_password() {
        let password = "Abcd1!";
        let hash = hasher().hash(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hasher().hash("Abcd1!").unwrap();
        let second = hasher().hash("Abcd1!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let hash = hasher().hash("Abcd1!").unwrap();
        assert!(hasher().verify("Abcd1!", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hasher().hash("Abcd1!").unwrap();
        assert!(!hasher().verify("Abcd1?", &hash).expect("Failed to verify password"));
        assert!(!hasher().verify("", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_invalid_cost_is_internal_error() {
        let result = PasswordHasher::new(3).hash("Abcd1!");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let result = hasher().verify("Abcd1!", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
