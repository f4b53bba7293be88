//! PostgreSQL user repository

use async_trait::async_trait;
use chrono::Utc;
use common::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;
use uuid::Uuid;

use super::UserStore;
use crate::models::{Role, User, UserRecord};

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> DatabaseResult<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))
    }
}

fn map_user(row: &PgRow) -> DatabaseResult<User> {
    let role: String = row.try_get("role").map_err(DatabaseError::Query)?;
    let role = role.parse::<Role>().map_err(DatabaseError::Decode)?;

    Ok(User {
        id: row.try_get("id").map_err(DatabaseError::Query)?,
        email: row.try_get("email").map_err(DatabaseError::Query)?,
        password_hash: row.try_get("password_hash").map_err(DatabaseError::Query)?,
        first_name: row.try_get("first_name").map_err(DatabaseError::Query)?,
        last_name: row.try_get("last_name").map_err(DatabaseError::Query)?,
        role,
        is_active: row.try_get("is_active").map_err(DatabaseError::Query)?,
        created_at: row.try_get("created_at").map_err(DatabaseError::Query)?,
        updated_at: row.try_get("updated_at").map_err(DatabaseError::Query)?,
    })
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::Query)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn find_admins(&self) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY created_at",
            USER_COLUMNS
        ))
        .bind(Role::Admin.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        rows.iter().map(map_user).collect()
    }

    async fn insert(&self, record: UserRecord) -> DatabaseResult<User> {
        info!("Creating new user: {}", record.email);

        let now = Utc::now();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, role, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $7)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(record.role.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        map_user(&row)
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> DatabaseResult<bool> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(password_hash)
                .execute(&self.pool)
                .await
                .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        row.as_ref().map(map_user).transpose()
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        common::database::health_check(&self.pool).await
    }
}
