//! User persistence
//!
//! `UserStore` is the seam between the credential logic and storage. The
//! PostgreSQL implementation backs the running service; the in-memory one
//! backs tests and local runs without a database.

use async_trait::async_trait;
use common::DatabaseResult;
use uuid::Uuid;

use crate::models::{User, UserRecord};

pub mod memory;
pub mod user;

pub use memory::InMemoryUserStore;
pub use user::UserRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Exact, case-sensitive email match
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_admins(&self) -> DatabaseResult<Vec<User>>;

    /// Persist a new user; a taken email yields `DatabaseError::UniqueViolation`
    async fn insert(&self, record: UserRecord) -> DatabaseResult<User>;

    /// Returns `false` when no user has this id
    async fn update_password(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool>;

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Option<User>>;

    async fn health_check(&self) -> DatabaseResult<bool>;
}
