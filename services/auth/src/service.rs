//! Credential and session logic
//!
//! There is no server-side session: every decision is reconstructed from the
//! presented token, the wall clock and the current user record. Re-reading the
//! record on each verification is what makes deactivation and role changes
//! effective on the next request.

use tracing::{debug, info, warn};

use crate::{
    error::{AuthError, AuthResult},
    jwt::{JwtService, TokenPair},
    models::{AuthPayload, User},
    users::UserService,
};

/// Outcome of a successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: AuthPayload,
    pub tokens: TokenPair,
}

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: UserService, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Look up an active account by email and check its password
    ///
    /// Unknown email, wrong password and inactive account all yield `None`.
    pub async fn validate_user(&self, email: &str, password: &str) -> AuthResult<Option<User>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.users.verify_unknown_account(password).await?;
            return Ok(None);
        };

        if !self.users.validate_password(&user, password).await? {
            return Ok(None);
        }

        if !user.is_active {
            warn!("Login refused for inactive user {}", user.id);
            return Ok(None);
        }

        Ok(Some(user))
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let user = self
            .validate_user(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let payload = user.payload();
        let tokens = self.generate_tokens(&payload)?;

        info!("User {} logged in", user.id);
        Ok(LoginOutcome {
            user: payload,
            tokens,
        })
    }

    pub fn generate_tokens(&self, payload: &AuthPayload) -> AuthResult<TokenPair> {
        Ok(self.jwt.issue(payload)?)
    }

    /// Exchange a refresh token for a brand-new pair
    ///
    /// Every rejection surfaces as `InvalidRefreshToken` so callers cannot
    /// tell which check failed. The presented token is not revoked and stays
    /// usable until its own expiry.
    pub async fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.jwt.verify_refresh(refresh_token).map_err(|e| {
            debug!("Refresh token rejected: {}", e);
            AuthError::InvalidRefreshToken
        })?;

        let user = match self.users.find_by_id(claims.id).await? {
            Some(user) if user.is_active => user,
            Some(_) => {
                debug!("Refresh refused for inactive user {}", claims.id);
                return Err(AuthError::InvalidRefreshToken);
            }
            None => {
                debug!("Refresh token names unknown user {}", claims.id);
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        self.generate_tokens(&user.payload())
    }

    /// Resolve the identity behind an access token
    pub async fn authenticate(&self, access_token: &str) -> AuthResult<AuthPayload> {
        let claims = self.jwt.verify_access(access_token).map_err(|e| {
            debug!("Access token rejected: {}", e);
            AuthError::Unauthenticated
        })?;

        match self.users.find_by_id(claims.id).await? {
            Some(user) if user.is_active => Ok(user.payload()),
            _ => Err(AuthError::Unauthenticated),
        }
    }
}
