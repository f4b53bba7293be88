//! Per-request gates
//!
//! Plain functions so any HTTP layer can call them; `middleware` wires them
//! into axum.

use crate::{
    error::{AuthError, AuthResult},
    models::AuthPayload,
    service::AuthService,
};

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: Option<&str>) -> AuthResult<&str> {
    let (scheme, token) = header
        .and_then(|value| value.split_once(' '))
        .ok_or(AuthError::Unauthenticated)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::Unauthenticated);
    }

    Ok(token)
}

/// Authentication gate: header in, resolved identity out
pub async fn authenticate_header(
    auth: &AuthService,
    header: Option<&str>,
) -> AuthResult<AuthPayload> {
    let token = bearer_token(header)?;
    auth.authenticate(token).await
}

/// Role gate: trusts the identity resolved earlier in the same request
pub fn require_admin(identity: Option<&AuthPayload>) -> AuthResult<()> {
    match identity {
        Some(identity) if identity.role.is_admin() => Ok(()),
        Some(_) => Err(AuthError::Forbidden),
        None => Err(AuthError::Unauthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use uuid::Uuid;

    fn identity(role: Role) -> AuthPayload {
        AuthPayload {
            id: Uuid::new_v4(),
            email: "someone@test.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(Some("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn test_bearer_token_rejects_malformed_headers() {
        for header in [None, Some(""), Some("Bearer"), Some("Bearer   "), Some("Basic abc")] {
            assert!(matches!(
                bearer_token(header),
                Err(AuthError::Unauthenticated)
            ));
        }
    }

    #[test]
    fn test_require_admin() {
        assert!(require_admin(Some(&identity(Role::Admin))).is_ok());
        assert!(matches!(
            require_admin(Some(&identity(Role::User))),
            Err(AuthError::Forbidden)
        ));
        assert!(matches!(require_admin(None), Err(AuthError::Unauthenticated)));
    }
}
