//! Authentication service for the solar shop backend
//!
//! Issues and verifies JWT access/refresh pairs, exposes the login/refresh/me
//! endpoints and gates admin routes on the caller's role.

pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod error;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod users;
pub mod validation;

use std::sync::Arc;

use crate::{
    config::ServiceConfig,
    error::AuthResult,
    jwt::JwtService,
    password::PasswordHasher,
    rate_limiter::RateLimiter,
    repositories::UserStore,
    service::AuthService,
    users::UserService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>, config: ServiceConfig) -> AuthResult<Self> {
        let hasher = PasswordHasher::new(config.password)?;
        let user_service = UserService::new(store, hasher, config.request_timeout);
        let jwt_service = JwtService::new(config.jwt)?;

        Ok(Self {
            auth_service: AuthService::new(user_service.clone(), jwt_service),
            user_service,
            rate_limiter: RateLimiter::new(config.rate_limiter),
        })
    }
}
