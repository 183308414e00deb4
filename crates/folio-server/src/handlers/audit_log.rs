use axum::extract::State;
use folio_api::{ApiError, ApiResponse};
use folio_auth::{BearerAuth, keys};
use serde_json::{Value, json};

use crate::cache::cache_aside;
use crate::error::storage_error;
use crate::server::AppState;

/// The caller's newest audit entries, newest first.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    BearerAuth(ctx): BearerAuth,
) -> Result<ApiResponse<Value>, ApiError> {
    let actor_id = ctx.user_id();
    let limit = state.cache_config.audit_log_page_size;
    let audit_logs = cache_aside(
        state.cache.as_ref(),
        &keys::user_audit_logs(actor_id),
        state.cache_config.audit_logs_ttl,
        || async {
            state
                .storage
                .recent_audit_logs(actor_id, limit)
                .await
                .map(Some)
        },
    )
    .await
    .map_err(storage_error)?
    .unwrap_or_default();

    Ok(ApiResponse::ok(
        "Audit logs retrieved successfully",
        json!({ "auditLogs": audit_logs }),
    ))
}
