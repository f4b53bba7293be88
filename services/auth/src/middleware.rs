//! Middleware for JWT token validation and role checks

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AuthError, guard, models::AuthPayload};

/// Resolve the caller from the Authorization header and attach the identity
/// to the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let identity = guard::authenticate_header(&state.auth_service, header.as_deref()).await?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Admin-only gate; must run after `auth_middleware`
pub async fn admin_middleware(req: Request<Body>, next: Next) -> Result<Response, AuthError> {
    guard::require_admin(req.extensions().get::<AuthPayload>())?;

    Ok(next.run(req).await)
}
