//! Error types for the PostgreSQL storage backend.

use folio_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(String),

    /// A stored value could not be decoded into a domain type.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Maps a unique-constraint name to the domain field it protects.
fn constraint_field(constraint: &str) -> &str {
    match constraint {
        "users_email_key" => "email",
        "users_username_key" => "username",
        "profiles_user_id_key" => "user_id",
        other => other,
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Database(SqlxError::Database(db_err)) if db_err.is_unique_violation() => {
                let field = constraint_field(db_err.constraint().unwrap_or("unknown"));
                StorageError::conflict(field, db_err.message())
            }
            PostgresError::Database(SqlxError::RowNotFound) => {
                StorageError::not_found("row", "unknown")
            }
            PostgresError::Database(
                e @ (SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_)),
            ) => StorageError::connection(e.to_string()),
            PostgresError::Database(e) => StorageError::internal(e.to_string()),
            PostgresError::Migration(e) => StorageError::internal(format!("Migration error: {e}")),
            PostgresError::Decode(e) => StorageError::internal(format!("Decode error: {e}")),
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
