//! Password hashing and verification
//!
//! Argon2id with a configurable time cost. A wrong password is a plain `false`;
//! a stored hash that cannot be parsed means the credential store holds
//! something this service never wrote, which is reported as an error.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::{self, SaltString},
};
use thiserror::Error;

/// Password hashing configuration
#[derive(Debug, Clone, Copy)]
pub struct PasswordConfig {
    /// Argon2 time cost (number of passes)
    pub cost: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            cost: Params::DEFAULT_T_COST,
        }
    }
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid password hash parameters: {0}")]
    InvalidParams(String),

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Argon2 password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            config.cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    /// Compare a plaintext password against a stored hash
    ///
    /// Parameters embedded in the stored hash win over the configured cost, so
    /// hashes written under an older cost keep verifying.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::MalformedHash(e.to_string())),
        }
    }
}
