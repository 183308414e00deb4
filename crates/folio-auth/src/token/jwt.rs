//! HS256 JWT encoding and validation.
//!
//! Access and refresh tokens share the same claim set and differ only in the
//! secret and lifetime, so one [`JwtService`] is built per token kind.
//!
//! ## Example
//!
//! ```ignore
//! use folio_auth::token::JwtService;
//!
//! let service = JwtService::new(b"secret", Duration::from_secs(900));
//! let token = service.sign(user_id, session_id)?;
//! let claims = service.decode(&token)?;
//! ```

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    Encoding(String),

    #[error("Failed to decode token: {0}")]
    Decoding(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::MissingRequiredClaim(_) | ErrorKind::ImmatureSignature => {
                Self::InvalidClaims(err.to_string())
            }
            _ => Self::Decoding(err.to_string()),
        }
    }
}

/// Claims carried by both access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub session_id: Uuid,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

impl SessionClaims {
    /// Claims issued now and valid for `lifetime`.
    #[must_use]
    pub fn new(user_id: Uuid, session_id: Uuid, lifetime: Duration) -> Self {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let lifetime = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
        Self {
            user_id,
            session_id,
            iat,
            exp: iat.saturating_add(lifetime),
        }
    }
}

/// Signs and validates [`SessionClaims`] with one HMAC secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Signs fresh claims binding `user_id` and `session_id`.
    pub fn sign(&self, user_id: Uuid, session_id: Uuid) -> Result<String, JwtError> {
        self.encode(&SessionClaims::new(user_id, session_id, self.lifetime))
    }

    pub fn encode(&self, claims: &SessionClaims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Verifies signature and expiry and returns the claims.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, JwtError> {
        Ok(decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?.claims)
    }
}

impl fmt::Debug for JwtService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &"HS256")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}
