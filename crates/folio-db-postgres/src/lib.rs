//! PostgreSQL storage backend for the folio server.
//!
//! Implements the storage traits from `folio-storage` with `sqlx`. The schema
//! is embedded in the binary and applied at start-up.
//!
//! # Example
//!
//! ```ignore
//! use folio_db_postgres::{PostgresConfig, PostgresStorage};
//!
//! let storage = PostgresStorage::connect(&PostgresConfig::new("postgres://localhost/folio")).await?;
//! ```

mod audit;
pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
mod profile;
mod project;
mod storage;
mod user;

pub use config::PostgresConfig;
pub use error::PostgresError;
pub use pool::create_pool;
pub use storage::PostgresStorage;
