//! Audit log service.
//!
//! Every mutating action appends one immutable entry and drops the actor's
//! cached page of recent entries.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use folio_auth::keys;
use folio_storage::{
    AuditAction, AuditLogEntry, DynCache, DynStorage, NewAuditLogEntry, StorageResult,
};
use serde_json::json;
use uuid::Uuid;

use crate::cache::invalidate;

/// Client details recorded as audit metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip: Option<String>,
    pub user_agent: String,
}

impl RequestMeta {
    /// Extracts the client address and user agent.
    ///
    /// The address is the first hop of `x-forwarded-for`, else the peer.
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
            .to_string();

        Self { ip, user_agent }
    }

    pub fn to_metadata(&self) -> serde_json::Value {
        json!({ "ip": self.ip, "userAgent": self.user_agent })
    }
}

impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}

/// Appends audit entries and keeps the cached recent page consistent.
#[derive(Clone)]
pub struct AuditLogService {
    storage: DynStorage,
    cache: DynCache,
}

impl AuditLogService {
    pub fn new(storage: DynStorage, cache: DynCache) -> Self {
        Self { storage, cache }
    }

    /// Writes one entry for `actor_id`, then invalidates the actor's cached page.
    ///
    /// The entity type follows from `action`.
    pub async fn record(
        &self,
        actor_id: Uuid,
        action: AuditAction,
        entity_id: impl ToString,
        meta: &RequestMeta,
    ) -> StorageResult<AuditLogEntry> {
        let entry = self
            .storage
            .append_audit_log(NewAuditLogEntry {
                actor_id,
                action,
                entity_type: action.entity_type(),
                entity_id: entity_id.to_string(),
                metadata: Some(meta.to_metadata()),
            })
            .await?;

        tracing::debug!(%actor_id, action = action.as_str(), "audit entry recorded");
        invalidate(self.cache.as_ref(), &keys::user_audit_logs(actor_id)).await;
        Ok(entry)
    }
}
