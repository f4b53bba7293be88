//! Request and response bodies
//!
//! Request fields are optional at the serde level so a missing field becomes a
//! 400 with a useful message instead of an extractor rejection. Each request
//! has a `validate` step producing the typed input the service works with.

use serde::{Deserialize, Serialize};

use crate::{
    error::{AuthError, AuthResult},
    jwt::TokenPair,
    models::{AuthPayload, NewUser, Role, UserProfile},
    validation::{require_field, validate_email, validate_password},
};

/// Request for user login
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated login input
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> AuthResult<Credentials> {
        let email = require_field(self.email, "Email is required").map_err(AuthError::BadRequest)?;
        let password =
            require_field(self.password, "Password is required").map_err(AuthError::BadRequest)?;
        Ok(Credentials { email, password })
    }
}

/// Request for token refresh
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: Option<String>,
}

impl RefreshTokenRequest {
    pub fn validate(self) -> AuthResult<String> {
        require_field(self.refresh_token, "Refresh token required").map_err(AuthError::BadRequest)
    }
}

/// Request for a password change by the signed-in user
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(self) -> AuthResult<PasswordChange> {
        let current_password = require_field(self.current_password, "Current password is required")
            .map_err(AuthError::BadRequest)?;
        let new_password = require_field(self.new_password, "New password is required")
            .map_err(AuthError::BadRequest)?;
        validate_password(&new_password).map_err(AuthError::BadRequest)?;
        Ok(PasswordChange {
            current_password,
            new_password,
        })
    }
}

/// Request for creating an account from the back office
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(self) -> AuthResult<NewUser> {
        let email = require_field(self.email, "Email is required").map_err(AuthError::BadRequest)?;
        validate_email(&email).map_err(AuthError::BadRequest)?;
        let password =
            require_field(self.password, "Password is required").map_err(AuthError::BadRequest)?;
        validate_password(&password).map_err(AuthError::BadRequest)?;

        Ok(NewUser {
            email,
            password,
            role: self.role.unwrap_or_default(),
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

/// Request for activating or deactivating an account
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_active: Option<bool>,
}

impl UpdateStatusRequest {
    pub fn validate(self) -> AuthResult<bool> {
        self.is_active
            .ok_or_else(|| AuthError::BadRequest("isActive is required".to_string()))
    }
}

/// Response for user login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: AuthPayload,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Response for token refresh
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub message: String,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub user: AuthPayload,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserProfile>,
}
