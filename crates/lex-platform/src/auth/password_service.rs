//! Password Service
//!
//! Argon2id hashing and the account password policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::warn;

use crate::shared::error::{PlatformError, Result};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Argon2id cost parameters
#[derive(Debug, Clone)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Iterations
    pub time_cost: u32,
    pub parallelism: u32,
    /// Output hash length in bytes
    pub output_len: usize,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
            output_len: 32,
        }
    }
}

impl Argon2Config {
    /// Low-cost config for tests
    pub fn testing() -> Self {
        Self {
            memory_cost: 4096,
            time_cost: 1,
            parallelism: 1,
            output_len: 32,
        }
    }

    fn to_params(&self) -> Result<Params> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(self.output_len),
        )
        .map_err(|e| PlatformError::internal(format!("Invalid Argon2 params: {}", e)))
    }
}

/// Password hashing and policy service
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new(config: Argon2Config) -> Result<Self> {
        let params = config.to_params()?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self { argon2 })
    }

    /// Check a candidate password against the policy
    pub fn validate_password(&self, password: &str) -> Result<()> {
        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(PlatformError::WeakPassword {
                min_length: MIN_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }

    /// Policy-check and hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        self.validate_password(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::internal(format!("Failed to hash password: {}", e)))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PlatformError::internal(format!("Invalid password hash format: {}", e)))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => {
                warn!("Password verification failed: incorrect password");
                Ok(false)
            }
            Err(e) => Err(PlatformError::internal(format!(
                "Password verification error: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> PasswordService {
        PasswordService::new(Argon2Config::testing()).unwrap()
    }

    #[test]
    fn test_policy_rejects_short_passwords() {
        let service = service();
        assert!(matches!(
            service.validate_password("abc12"),
            Err(PlatformError::WeakPassword { min_length: 6 })
        ));
        assert!(service.validate_password("abc123").is_ok());
    }

    #[test]
    fn test_hash_and_verify() {
        let service = service();

        let hash = service.hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        assert!(service.verify_password("secret123", &hash).unwrap());
        assert!(!service.verify_password("wrongpass", &hash).unwrap());
    }

    #[test]
    fn test_hash_uniqueness() {
        let service = service();

        let hash1 = service.hash_password("secret123").unwrap();
        let hash2 = service.hash_password("secret123").unwrap();

        // Random salt: same password, different hashes
        assert_ne!(hash1, hash2);
        assert!(service.verify_password("secret123", &hash1).unwrap());
        assert!(service.verify_password("secret123", &hash2).unwrap());
    }

    #[test]
    fn test_weak_password_is_not_hashed() {
        let service = service();
        assert!(service.hash_password("short").is_err());
    }
}
