use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::session::SessionStore;

use super::jwt::{JwtError, JwtService, SessionClaims};

/// Issues access tokens and login sessions.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    access: JwtService,
    refresh: JwtService,
    sessions: SessionStore,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, sessions: SessionStore) -> Self {
        Self {
            access: JwtService::new(
                config.access_token_secret.as_bytes(),
                config.access_token_lifetime,
            ),
            refresh: JwtService::new(
                config.refresh_token_secret.as_bytes(),
                config.refresh_token_lifetime,
            ),
            sessions,
        }
    }

    /// Signs a short-lived access token bound to one session. No side effects.
    pub fn issue_access_token(&self, user_id: Uuid, session_id: Uuid) -> Result<String, AuthError> {
        Ok(self.access.sign(user_id, session_id)?)
    }

    /// Opens a new login session for `user_id` and returns its id.
    ///
    /// A fresh random session id is generated, a refresh token binding it is
    /// signed and stored in the session store, and the user's session
    /// collection expiry is reset.
    pub async fn issue_refresh_session(&self, user_id: Uuid) -> Result<Uuid, AuthError> {
        let session_id = Uuid::new_v4();
        let token = self.refresh.sign(user_id, session_id)?;
        self.sessions.put(user_id, session_id, &token).await?;
        tracing::debug!(%user_id, %session_id, "session opened");
        Ok(session_id)
    }

    /// Issues a new access token for a session that is still open.
    ///
    /// The stored refresh token must itself be valid and bound to the same
    /// user and session. The collection expiry is shared by all sessions of a
    /// user, so a stale field is dropped here.
    pub async fn refresh_access_token(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<String, AuthError> {
        let Some(stored) = self.sessions.get(user_id, session_id).await? else {
            return Err(AuthError::RefreshExpired);
        };

        match self.verify_refresh_token(&stored) {
            Ok(claims) if claims.user_id == user_id && claims.session_id == session_id => {
                self.issue_access_token(user_id, session_id)
            }
            Ok(_) => {
                tracing::warn!(%user_id, %session_id, "stored refresh token bound to another session");
                self.sessions.delete(user_id, session_id).await?;
                Err(AuthError::RefreshExpired)
            }
            Err(e) => {
                tracing::debug!(%user_id, %session_id, error = %e, "stored refresh token rejected");
                self.sessions.delete(user_id, session_id).await?;
                Err(AuthError::RefreshExpired)
            }
        }
    }

    /// Verifies an access token's signature and expiry.
    pub fn verify_access_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.access.decode(token)
    }

    /// Verifies a refresh token's signature and expiry.
    pub fn verify_refresh_token(&self, token: &str) -> Result<SessionClaims, JwtError> {
        self.refresh.decode(token)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
