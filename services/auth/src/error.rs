//! Error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{jwt::TokenError, password::PasswordError};

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, invalid or expired access token, or a deactivated account
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated but lacking the required role
    #[error("Forbidden resource")]
    Forbidden,

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh token failed any check
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Too many login attempts")]
    TooManyAttempts,

    /// Store lookup or hashing exceeded the request timeout
    #[error("Operation timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated
            | AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Conflict(_) => StatusCode::CONFLICT,
            AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            AuthError::Timeout
            | AuthError::Database(_)
            | AuthError::Password(_)
            | AuthError::Token(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "statusCode": status.as_u16(),
            "message": message,
            "error": status.canonical_reason().unwrap_or("Error"),
        }));

        (status, body).into_response()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidRefreshToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::TooManyAttempts.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AuthError::Timeout.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AuthError::Database(DatabaseError::Migration("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_details() {
        let response =
            AuthError::Database(DatabaseError::Configuration("secret dsn".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["statusCode"], 500);
    }
}
