//! JWT service for token generation and validation
//!
//! Access and refresh tokens are both HS256-signed and carry the same
//! `{id, email, role}` payload, but each class has its own secret: a token of
//! one class never validates as the other.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuthPayload, Role};

/// Longest accepted token lifetime, ten years
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for signing access tokens
    pub access_secret: String,
    /// Secret for signing refresh tokens
    pub refresh_secret: String,
    /// Access token expiration time in seconds (default: 15 minutes)
    pub access_token_expiry: u64,
    /// Refresh token expiration time in seconds (default: 7 days)
    pub refresh_token_expiry: u64,
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err("JWT secrets must not be empty".to_string());
        }
        if self.access_secret == self.refresh_secret {
            return Err("JWT_SECRET and JWT_REFRESH_SECRET must differ".to_string());
        }
        if self.access_token_expiry == 0 || self.refresh_token_expiry == 0 {
            return Err("Token lifetimes must be positive".to_string());
        }
        if self.access_token_expiry > MAX_TOKEN_LIFETIME_SECS
            || self.refresh_token_expiry > MAX_TOKEN_LIFETIME_SECS
        {
            return Err(format!(
                "Token lifetimes must not exceed {} seconds",
                MAX_TOKEN_LIFETIME_SECS
            ));
        }
        Ok(())
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    /// Token type (access or refresh)
    pub token_type: TokenType,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

/// Freshly issued credentials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// Bad signature, malformed token, wrong class or elapsed expiry
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("System clock error: {0}")]
    Clock(String),
}

/// Signing and verification keys for one token class
#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
    config: JwtConfig,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        config.validate().map_err(TokenError::Invalid)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Ok(JwtService {
            access_keys: KeyPair::from_secret(&config.access_secret),
            refresh_keys: KeyPair::from_secret(&config.refresh_secret),
            validation,
            config,
        })
    }

    /// Issue an access/refresh pair for the given identity
    pub fn issue(&self, payload: &AuthPayload) -> Result<TokenPair, TokenError> {
        let now = unix_now()?;

        let access_token = self.sign(payload, TokenType::Access, now)?;
        let refresh_token = self.sign(payload, TokenType::Refresh, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_expiry,
        })
    }

    /// Validate an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenType::Access)
    }

    /// Validate a refresh token and return its claims
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenType::Refresh)
    }

    fn sign(
        &self,
        payload: &AuthPayload,
        token_type: TokenType,
        now: u64,
    ) -> Result<String, TokenError> {
        let (keys, lifetime) = match token_type {
            TokenType::Access => (&self.access_keys, self.config.access_token_expiry),
            TokenType::Refresh => (&self.refresh_keys, self.config.refresh_token_expiry),
        };

        let exp = now
            .checked_add(lifetime)
            .ok_or_else(|| TokenError::Signing("token expiry overflows".to_string()))?;

        let claims = Claims {
            id: payload.id,
            email: payload.email.clone(),
            role: payload.role,
            token_type,
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let keys = match expected {
            TokenType::Access => &self.access_keys,
            TokenType::Refresh => &self.refresh_keys,
        };

        let claims = decode::<Claims>(token, &keys.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?
            .claims;

        if claims.token_type != expected {
            return Err(TokenError::Invalid(format!(
                "expected {:?} token, got {:?}",
                expected, claims.token_type
            )));
        }

        Ok(claims)
    }
}

fn unix_now() -> Result<u64, TokenError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| TokenError::Clock(e.to_string()))
}
