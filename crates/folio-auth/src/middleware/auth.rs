//! Bearer token authentication extractor.
//!
//! A protected request carries two credentials:
//!
//! - `Authorization: Bearer <access token>`
//! - `x-session-id: <session id>`
//!
//! Both are required. A structurally valid token is not enough on its own:
//! the session must still be open in the session store and the user's identity
//! must still be cached. Logout and forced sign-out therefore take effect
//! immediately even though access tokens are stateless.
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get};
//! use folio_auth::middleware::{AuthState, BearerAuth};
//!
//! async fn me(BearerAuth(auth): BearerAuth) -> String {
//!     auth.user.username
//! }
//!
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .with_state(auth_state);
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};
use folio_storage::DynCache;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::IdentityCache;
use crate::session::SessionStore;
use crate::token::TokenIssuer;

use super::types::AuthContext;

/// Header carrying the session id, separate from the token.
pub const SESSION_ID_HEADER: &str = "x-session-id";

// =============================================================================
// Auth State
// =============================================================================

/// State required for request authentication.
///
/// Include it in the application state and expose it via `FromRef`.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
    pub identities: IdentityCache,
}

impl AuthState {
    /// Builds the token issuer, session store and identity cache over `cache`.
    pub fn new(config: &AuthConfig, cache: DynCache) -> Self {
        let sessions = SessionStore::new(cache.clone(), config.refresh_token_lifetime);
        Self {
            issuer: Arc::new(TokenIssuer::new(config, sessions)),
            identities: IdentityCache::new(cache, config.refresh_token_lifetime),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        self.issuer.sessions()
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Resolves the caller of a request from its headers.
///
/// 1. Both the bearer header and the session id header must be present.
/// 2. The access token must carry a valid signature and must not be expired.
/// 3. The session id header must name the session bound into the token.
/// 4. The session must still exist in the session store.
/// 5. The user's identity must still be cached.
///
/// Read-only: nothing is written to the cache.
///
/// # Errors
///
/// Returns an unauthorized `AuthError` for every failed check, or
/// `AuthError::Cache` if the cache cannot be reached.
pub async fn authenticate(state: &AuthState, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .filter(|h| *h == "Bearer" || h.starts_with("Bearer "));
    let session_header = headers
        .get(SESSION_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (Some(authorization), Some(session_header)) = (authorization, session_header) else {
        return Err(AuthError::MissingCredentials);
    };

    let token = authorization
        .strip_prefix("Bearer")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::TokenMissing)?;

    let claims = state.issuer.verify_access_token(token)?;

    let session_id = Uuid::parse_str(session_header).map_err(|_| AuthError::SessionMismatch)?;
    if session_id != claims.session_id {
        tracing::debug!(user_id = %claims.user_id, "session header does not match token");
        return Err(AuthError::SessionMismatch);
    }

    if state
        .sessions()
        .get(claims.user_id, session_id)
        .await?
        .is_none()
    {
        return Err(AuthError::SessionInvalid);
    }

    let user = state
        .identities
        .get(claims.user_id)
        .await?
        .ok_or(AuthError::NotLoggedIn)?;

    Ok(AuthContext { user, session_id })
}

// =============================================================================
// Bearer Auth Extractor
// =============================================================================

/// Axum extractor for routes that require authentication.
///
/// Rejects with `AuthError` (which implements `IntoResponse`).
pub struct BearerAuth(pub AuthContext);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        let context = authenticate(&auth_state, &parts.headers).await?;
        Ok(BearerAuth(context))
    }
}

// =============================================================================
// Optional Bearer Auth Extractor
// =============================================================================

/// Axum extractor for routes that serve anonymous callers too.
///
/// A request without an `Authorization` header is anonymous (`None`). A request
/// that presents credentials must present valid ones.
pub struct OptionalBearerAuth(pub Option<AuthContext>);

impl OptionalBearerAuth {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0.as_ref().map(AuthContext::user_id)
    }
}

impl<S> FromRequestParts<S> for OptionalBearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(OptionalBearerAuth(None));
        }
        let auth_state = AuthState::from_ref(state);
        let context = authenticate(&auth_state, &parts.headers).await?;
        Ok(OptionalBearerAuth(Some(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, Request};
    use folio_db_memory::create_cache;
    use folio_storage::User;
    use std::time::Duration;
    use time::OffsetDateTime;

    use crate::token::{JwtService, SessionClaims};

    fn config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "access-secret".into(),
            refresh_token_secret: "refresh-secret".into(),
            ..Default::default()
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".into(),
            username: "a".into(),
            password_hash: String::new(),
            first_name: "A".into(),
            last_name: "B".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    /// Logs `user` in and returns (state, access token, session id).
    async fn logged_in(user: &User) -> (AuthState, String, Uuid) {
        let state = AuthState::new(&config(), create_cache());
        let session_id = state.issuer.issue_refresh_session(user.id).await.unwrap();
        let token = state.issuer.issue_access_token(user.id, session_id).unwrap();
        state.identities.put(user).await.unwrap();
        (state, token, session_id)
    }

    fn headers(token: Option<&str>, session: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
        }
        if let Some(session) = session {
            headers.insert(SESSION_ID_HEADER, HeaderValue::from_str(session).unwrap());
        }
        headers
    }

    #[tokio::test]
    async fn valid_credentials_resolve_identity() {
        let user = user();
        let (state, token, session_id) = logged_in(&user).await;
        let context = authenticate(&state, &headers(Some(&token), Some(&session_id.to_string())))
            .await
            .unwrap();
        assert_eq!(context.user_id(), user.id);
        assert_eq!(context.session_id, session_id);
    }

    #[tokio::test]
    async fn missing_headers_rejected() {
        let user = user();
        let (state, token, session_id) = logged_in(&user).await;

        let err = authenticate(&state, &headers(None, Some(&session_id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));

        let err = authenticate(&state, &headers(Some(&token), None))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
    }

    #[tokio::test]
    async fn empty_bearer_is_token_missing() {
        let user = user();
        let (state, _, session_id) = logged_in(&user).await;
        let mut headers = headers(None, Some(&session_id.to_string()));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        let err = authenticate(&state, &headers).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenMissing));
    }

    #[tokio::test]
    async fn bad_and_expired_tokens_rejected() {
        let user = user();
        let (state, _, session_id) = logged_in(&user).await;

        let err = authenticate(&state, &headers(Some("garbage"), Some(&session_id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));

        let signer = JwtService::new(b"access-secret", Duration::from_secs(900));
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let expired = signer
            .encode(&SessionClaims {
                user_id: user.id,
                session_id,
                iat: now - 1000,
                exp: now - 100,
            })
            .unwrap();
        let err = authenticate(&state, &headers(Some(&expired), Some(&session_id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn refresh_token_cannot_authenticate() {
        let user = user();
        let (state, _, session_id) = logged_in(&user).await;
        let refresh = state
            .sessions()
            .get(user.id, session_id)
            .await
            .unwrap()
            .unwrap();
        let err = authenticate(&state, &headers(Some(&refresh), Some(&session_id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn session_header_must_match_token() {
        let user = user();
        let (state, token, _) = logged_in(&user).await;
        let err = authenticate(&state, &headers(Some(&token), Some(&Uuid::new_v4().to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionMismatch));
    }

    #[tokio::test]
    async fn revoked_session_rejected_before_expiry() {
        let user = user();
        let (state, token, session_id) = logged_in(&user).await;
        state.sessions().delete(user.id, session_id).await.unwrap();

        let err = authenticate(&state, &headers(Some(&token), Some(&session_id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
    }

    #[tokio::test]
    async fn cleared_identity_rejected() {
        let user = user();
        let (state, token, session_id) = logged_in(&user).await;
        state.identities.clear(user.id).await.unwrap();

        let err = authenticate(&state, &headers(Some(&token), Some(&session_id.to_string())))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotLoggedIn));
    }

    #[tokio::test]
    async fn optional_extractor_allows_anonymous() {
        let user = user();
        let (state, token, session_id) = logged_in(&user).await;

        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let OptionalBearerAuth(anon) = OptionalBearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(anon.is_none());

        let mut request = Request::builder().body(()).unwrap();
        *request.headers_mut() = headers(Some(&token), Some(&session_id.to_string()));
        let (mut parts, _) = request.into_parts();
        let auth = OptionalBearerAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(auth.user_id(), Some(user.id));

        let mut request = Request::builder().body(()).unwrap();
        *request.headers_mut() = headers(Some("garbage"), Some(&session_id.to_string()));
        let (mut parts, _) = request.into_parts();
        assert!(OptionalBearerAuth::from_request_parts(&mut parts, &state)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn bearer_extractor_rejects_anonymous() {
        let state = AuthState::new(&config(), create_cache());
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(
            BearerAuth::from_request_parts(&mut parts, &state).await,
            Err(AuthError::MissingCredentials)
        ));
    }
}
