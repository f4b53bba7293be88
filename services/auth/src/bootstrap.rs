//! First-start admin provisioning

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AuthResult,
    models::{NewUser, Role},
    users::UserService,
};

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_email: String,
    /// Provisioning is skipped when no initial password is configured
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(Uuid),
    AdminExists,
    EmailTaken,
    NotConfigured,
}

/// Create the initial admin account when the store has none
pub async fn ensure_admin_user(
    users: &UserService,
    config: &BootstrapConfig,
) -> AuthResult<BootstrapOutcome> {
    if !users.admins().await?.is_empty() {
        info!("Admin user already exists");
        return Ok(BootstrapOutcome::AdminExists);
    }

    let Some(password) = config.admin_password.as_ref() else {
        warn!("No admin account exists and ADMIN_INITIAL_PASSWORD is not set; skipping bootstrap");
        return Ok(BootstrapOutcome::NotConfigured);
    };

    if users.find_by_email(&config.admin_email).await?.is_some() {
        warn!(
            "Cannot bootstrap admin: {} belongs to a non-admin account",
            config.admin_email
        );
        return Ok(BootstrapOutcome::EmailTaken);
    }

    let admin = users
        .create(NewUser {
            email: config.admin_email.clone(),
            password: password.clone(),
            role: Role::Admin,
            first_name: Some("Admin".to_string()),
            last_name: Some("User".to_string()),
        })
        .await?;

    info!("Admin user {} created for {}", admin.id, admin.email);
    Ok(BootstrapOutcome::Created(admin.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        password::{PasswordConfig, PasswordHasher},
        repositories::InMemoryUserStore,
    };
    use std::sync::Arc;
    use std::time::Duration;

    fn users() -> UserService {
        UserService::new(
            Arc::new(InMemoryUserStore::new()),
            PasswordHasher::new(PasswordConfig { cost: 1 }).unwrap(),
            Duration::from_secs(5),
        )
    }

    fn config(password: Option<&str>) -> BootstrapConfig {
        BootstrapConfig {
            admin_email: "admin@test-agency.com".to_string(),
            admin_password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let users = users();
        let config = config(Some("Initial!Pass1"));

        let first = ensure_admin_user(&users, &config).await.unwrap();
        let BootstrapOutcome::Created(id) = first else {
            panic!("expected admin creation, got {:?}", first);
        };

        let admin = users.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(users.validate_password(&admin, "Initial!Pass1").await.unwrap());

        assert_eq!(
            ensure_admin_user(&users, &config).await.unwrap(),
            BootstrapOutcome::AdminExists
        );
        assert_eq!(users.admins().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_skips_without_password() {
        let users = users();

        assert_eq!(
            ensure_admin_user(&users, &config(None)).await.unwrap(),
            BootstrapOutcome::NotConfigured
        );
        assert!(users.admins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_does_not_promote_existing_user() {
        let users = users();
        users
            .create(NewUser {
                email: "admin@test-agency.com".to_string(),
                password: "Customer!Pass1".to_string(),
                role: Role::User,
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();

        assert_eq!(
            ensure_admin_user(&users, &config(Some("Initial!Pass1"))).await.unwrap(),
            BootstrapOutcome::EmailTaken
        );
        assert!(users.admins().await.unwrap().is_empty());
    }
}
