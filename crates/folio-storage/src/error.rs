//! Error types shared by every storage and cache backend.

/// Errors that can occur during persistent storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity (`user`, `profile`, `project`, ...).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// A unique constraint was violated.
    #[error("Conflict on {field}: {message}")]
    Conflict {
        /// Name of the unique field (`email`, `username`, `user_id`).
        field: String,
        /// Description of the conflict.
        message: String,
    },

    /// Input rejected by the backend.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failed to reach the storage backend.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Any other backend failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a unique-constraint conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns the conflicting field name, if this is a conflict.
    #[must_use]
    pub fn conflict_field(&self) -> Option<&str> {
        match self {
            Self::Conflict { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Errors raised by a [`CacheStore`](crate::CacheStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache server could not be reached or a pooled connection was unavailable.
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// The cache server rejected or failed a command.
    #[error("Cache command failed: {0}")]
    Command(String),

    /// A cached value could not be encoded or decoded.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
pub type CacheResult<T> = Result<T, CacheError>;
