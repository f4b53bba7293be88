//! Common library for the solar shop backend
//!
//! This crate provides shared functionality used across the backend
//! services: PostgreSQL connectivity and the storage error taxonomy.

pub mod database;
pub mod error;

pub use error::{DatabaseError, DatabaseResult};
