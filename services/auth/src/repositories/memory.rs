//! In-memory user store

use async_trait::async_trait;
use chrono::Utc;
use common::{DatabaseError, DatabaseResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::UserStore;
use crate::models::{User, UserRecord};

/// User store kept in process memory, keyed by id
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_admins(&self) -> DatabaseResult<Vec<User>> {
        let users = self.users.read().await;
        let mut admins: Vec<User> = users.values().filter(|u| u.role.is_admin()).cloned().collect();
        admins.sort_by_key(|u| u.created_at);
        Ok(admins)
    }

    async fn insert(&self, record: UserRecord) -> DatabaseResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == record.email) {
            return Err(DatabaseError::UniqueViolation(format!(
                "email {} already exists",
                record.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: record.email,
            password_hash: record.password_hash,
            first_name: record.first_name,
            last_name: record.last_name,
            role: record.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.is_active = is_active;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }
}
