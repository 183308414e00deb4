//! Authentication error types.

use folio_api::ApiError;
use folio_storage::CacheError;

use crate::token::JwtError;

/// Errors that can occur while issuing or checking credentials.
///
/// Every variant except `Cache` and `Internal` is a client error answered with
/// 401 and a stable message.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The bearer header or the session id header is absent.
    #[error("User Unauthorized")]
    MissingCredentials,

    /// The `Bearer` prefix is present but no token follows it.
    #[error("Unauthorized - token missing")]
    TokenMissing,

    /// Signature, format or claims are invalid.
    #[error("Unauthorized - invalid token")]
    InvalidToken {
        /// Why decoding failed. Logged, never returned to the client.
        reason: String,
    },

    #[error("Unauthorized - token expired")]
    TokenExpired,

    /// The session id header does not match the session bound into the token.
    #[error("Unauthorized - session mismatch")]
    SessionMismatch,

    /// The session was never created, expired or was revoked by logout.
    #[error("Unauthorized - session expired or invalid")]
    SessionInvalid,

    /// No cached identity exists for the user.
    #[error("Unauthorized - user not logged in")]
    NotLoggedIn,

    /// A refresh was requested for a session that no longer exists.
    #[error("Unauthorized - refresh token missing or expired")]
    RefreshExpired,

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    #[must_use]
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns `true` if this error must be answered with 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if this error is an infrastructure failure.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Cache(_) | Self::Internal(_))
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::Encoding(message) => Self::Internal(message),
            other => Self::invalid_token(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_server_error() {
            ApiError::internal(err.to_string())
        } else {
            ApiError::unauthorized(err.to_string())
        }
    }
}
