//! Custom error types for the common library
//!
//! This module defines the storage error taxonomy shared by the services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// A unique constraint rejected the write
    #[error("Duplicate value: {0}")]
    UniqueViolation(String),

    /// A stored row could not be mapped onto its model
    #[error("Row decode error: {0}")]
    Decode(String),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

impl DatabaseError {
    /// Classify a query error, separating unique violations from other failures
    pub fn from_query(err: SqlxError) -> Self {
        match &err {
            SqlxError::Database(db) if db.is_unique_violation() => {
                DatabaseError::UniqueViolation(db.message().to_string())
            }
            _ => DatabaseError::Query(err),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
