//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{ConnectInfo, Path, State, rejection::PathRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    dto::{
        ChangePasswordRequest, CreateUserRequest, CurrentUserResponse, LoginRequest,
        LoginResponse, MessageResponse, RefreshTokenRequest, RefreshTokenResponse,
        UpdateStatusRequest, UserResponse, UsersResponse,
    },
    error::AuthError,
    middleware::{admin_middleware, auth_middleware},
    models::AuthPayload,
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let authenticated = Router::new()
        .route("/api/auth/me", get(current_user))
        .route("/api/auth/password", put(change_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Layers run outside-in: authentication first, then the role check.
    let admin = Router::new()
        .route("/api/users", post(create_user))
        .route("/api/users/admins", get(list_admins))
        .route("/api/users/:id/status", put(update_user_status))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh_token))
        .route("/api/auth/logout", post(logout))
        .merge(authenticated)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.user_service.health_check().await.unwrap_or(false);
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "service": "auth-service",
            "database": database,
        })),
    )
}

/// User login endpoint
///
/// Failed attempts are throttled per client address.
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(client): ConnectInfo<SocketAddr>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let credentials = payload.map(|Json(p)| p).unwrap_or_default().validate()?;
    info!("Login attempt for user: {}", credentials.email);

    let client = client.ip().to_string();
    if !state.rate_limiter.is_allowed(&client).await {
        warn!("Login rate limit hit for {}", client);
        return Err(AuthError::TooManyAttempts);
    }

    let outcome = match state
        .auth_service
        .login(&credentials.email, &credentials.password)
        .await
    {
        Ok(outcome) => outcome,
        Err(AuthError::InvalidCredentials) => {
            state.rate_limiter.record_failure(&client).await;
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };

    let response = LoginResponse {
        message: "Login successful".to_string(),
        user: outcome.user,
        tokens: outcome.tokens,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    payload: Option<Json<RefreshTokenRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let refresh_token = payload.map(|Json(p)| p).unwrap_or_default().validate()?;
    info!("Token refresh request");

    let tokens = state.auth_service.refresh(&refresh_token).await?;

    let response = RefreshTokenResponse {
        message: "Token refreshed".to_string(),
        tokens,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Identity resolved by the authentication gate
pub async fn current_user(Extension(user): Extension<AuthPayload>) -> impl IntoResponse {
    Json(CurrentUserResponse { user })
}

/// Logout endpoint
///
/// Tokens are stateless; the client discards its copies.
pub async fn logout() -> impl IntoResponse {
    Json(MessageResponse::new("Logout successful"))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthPayload>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let change = payload.map(|Json(p)| p).unwrap_or_default().validate()?;

    let user = state
        .user_service
        .find_by_id(identity.id)
        .await?
        .ok_or(AuthError::Unauthenticated)?;

    if !state
        .user_service
        .validate_password(&user, &change.current_password)
        .await?
    {
        return Err(AuthError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    state
        .user_service
        .update_password(user.id, &change.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated")))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Option<Json<CreateUserRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let new_user = payload.map(|Json(p)| p).unwrap_or_default().validate()?;

    let user = state.user_service.create(new_user).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            user: (&user).into(),
        }),
    ))
}

pub async fn list_admins(State(state): State<AppState>) -> Result<impl IntoResponse, AuthError> {
    let admins = state.user_service.admins().await?;

    Ok(Json(UsersResponse {
        users: admins.iter().map(Into::into).collect(),
    }))
}

pub async fn update_user_status(
    State(state): State<AppState>,
    Extension(identity): Extension<AuthPayload>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Option<Json<UpdateStatusRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Path(id) = id.map_err(|_| AuthError::BadRequest("Invalid user id".to_string()))?;
    let is_active = payload.map(|Json(p)| p).unwrap_or_default().validate()?;

    if id == identity.id && !is_active {
        return Err(AuthError::BadRequest(
            "Admins cannot deactivate their own account".to_string(),
        ));
    }

    let user = state.user_service.set_active(id, is_active).await?;

    Ok(Json(UserResponse {
        user: (&user).into(),
    }))
}
