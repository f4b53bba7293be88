//! PostgreSQL repository tests
//!
//! Skipped unless `DATABASE_URL` points at a database the migrations may run on.

use auth::{
    models::{Role, UserRecord},
    repositories::{UserRepository, UserStore},
};
use common::{
    DatabaseError,
    database::{DatabaseConfig, init_pool},
};
use uuid::Uuid;

async fn repository() -> Option<UserRepository> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping repository test");
        return None;
    }

    let config = DatabaseConfig::from_env().unwrap();
    let pool = init_pool(&config).await.unwrap();
    let repository = UserRepository::new(pool);
    repository.migrate().await.unwrap();
    Some(repository)
}

fn record(email: &str, role: Role) -> UserRecord {
    UserRecord {
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        role,
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

#[tokio::test]
async fn test_user_round_trip() {
    let Some(repository) = repository().await else {
        return;
    };
    let email = format!("repo-{}@test.com", Uuid::new_v4());

    let user = repository.insert(record(&email, Role::User)).await.unwrap();
    assert!(user.is_active);
    assert_eq!(user.role, Role::User);

    let by_email = repository.find_by_email(&email).await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    let by_id = repository.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, email);

    assert!(repository.update_password(user.id, "$argon2id$other").await.unwrap());
    let updated = repository.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(updated.password_hash, "$argon2id$other");

    let deactivated = repository.set_active(user.id, false).await.unwrap().unwrap();
    assert!(!deactivated.is_active);

    assert!(repository.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(repository.set_active(Uuid::new_v4(), true).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_a_unique_violation() {
    let Some(repository) = repository().await else {
        return;
    };
    let email = format!("dup-{}@test.com", Uuid::new_v4());

    repository.insert(record(&email, Role::User)).await.unwrap();
    let err = repository.insert(record(&email, Role::User)).await.unwrap_err();

    assert!(matches!(err, DatabaseError::UniqueViolation(_)));
}

#[tokio::test]
async fn test_admins_are_listed() {
    let Some(repository) = repository().await else {
        return;
    };
    let email = format!("admin-{}@test.com", Uuid::new_v4());

    let admin = repository.insert(record(&email, Role::Admin)).await.unwrap();
    let admins = repository.find_admins().await.unwrap();

    assert!(admins.iter().any(|u| u.id == admin.id));
    assert!(admins.iter().all(|u| u.role == Role::Admin));
    assert!(repository.health_check().await.unwrap());
}
