//! User account operations
//!
//! Wraps a `UserStore` with password hashing and the per-request time bound.
//! Every store call and every hash computation runs under `request_timeout`;
//! running out of time is an infrastructure failure, not a credential one.

use common::DatabaseError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AuthError, AuthResult},
    models::{NewUser, User, UserRecord},
    password::{PasswordError, PasswordHasher},
    repositories::UserStore,
};

/// Run `fut` under `limit`, mapping an elapsed deadline to `AuthError::Timeout`
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        warn!("Operation exceeded {:?}", limit);
        AuthError::Timeout
    })?
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    request_timeout: Duration,
    /// Stand-in hash verified when a login names no account
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, request_timeout: Duration) -> Self {
        Self {
            store,
            hasher,
            request_timeout,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        bounded(self.request_timeout, async {
            self.store.find_by_id(id).await.map_err(AuthError::from)
        })
        .await
    }

    pub async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        bounded(self.request_timeout, async {
            self.store.find_by_email(email).await.map_err(AuthError::from)
        })
        .await
    }

    /// All accounts holding the admin role
    pub async fn admins(&self) -> AuthResult<Vec<User>> {
        bounded(self.request_timeout, async {
            self.store.find_admins().await.map_err(AuthError::from)
        })
        .await
    }

    /// Check a plaintext password against the user's stored hash
    pub async fn validate_password(&self, user: &User, password: &str) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        let stored_hash = user.password_hash.clone();
        let password = password.to_string();

        self.run_hasher(move || hasher.verify(&password, &stored_hash))
            .await
    }

    /// Run a password verification with no account behind it
    ///
    /// Keeps a miss on the email lookup as slow as a wrong password.
    pub async fn verify_unknown_account(&self, password: &str) -> AuthResult<()> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| async {
                let hasher = self.hasher.clone();
                self.run_hasher(move || hasher.hash("no-such-account")).await
            })
            .await?
            .clone();

        let hasher = self.hasher.clone();
        let password = password.to_string();
        self.run_hasher(move || hasher.verify(&password, &dummy_hash))
            .await?;
        Ok(())
    }

    /// Create an account, hashing its password first
    pub async fn create(&self, new_user: NewUser) -> AuthResult<User> {
        let hasher = self.hasher.clone();
        let password = new_user.password.clone();
        let password_hash = self.run_hasher(move || hasher.hash(&password)).await?;

        let record = UserRecord {
            email: new_user.email,
            password_hash,
            role: new_user.role,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
        };

        let user = bounded(self.request_timeout, async {
            self.store.insert(record).await.map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => {
                    AuthError::Conflict("Email already registered".to_string())
                }
                other => AuthError::Database(other),
            })
        })
        .await?;

        info!("Created {} account {}", user.role, user.id);
        Ok(user)
    }

    pub async fn update_password(&self, id: Uuid, new_password: &str) -> AuthResult<()> {
        let hasher = self.hasher.clone();
        let password = new_password.to_string();
        let password_hash = self.run_hasher(move || hasher.hash(&password)).await?;

        let updated = bounded(self.request_timeout, async {
            self.store
                .update_password(id, &password_hash)
                .await
                .map_err(AuthError::from)
        })
        .await?;

        if !updated {
            return Err(AuthError::NotFound("User not found".to_string()));
        }

        info!("Password updated for user {}", id);
        Ok(())
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AuthResult<User> {
        let user = bounded(self.request_timeout, async {
            self.store
                .set_active(id, is_active)
                .await
                .map_err(AuthError::from)
        })
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

        info!("User {} active flag set to {}", id, is_active);
        Ok(user)
    }

    pub async fn health_check(&self) -> AuthResult<bool> {
        bounded(self.request_timeout, async {
            self.store.health_check().await.map_err(AuthError::from)
        })
        .await
    }

    /// Hashing is CPU-bound; keep it off the async workers
    async fn run_hasher<T, F>(&self, job: F) -> AuthResult<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    {
        bounded(self.request_timeout, async {
            tokio::task::spawn_blocking(job)
                .await
                .map_err(|e| AuthError::Internal(format!("Password task failed: {}", e)))
                .and_then(|outcome| outcome.map_err(AuthError::from))
        })
        .await
    }
}
