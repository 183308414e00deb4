//! Profile of the authenticated user.

use axum::extract::State;
use folio_api::{ApiError, ApiResponse};
use folio_auth::{BearerAuth, keys};
use folio_storage::{AuditAction, ProfileChanges};
use serde_json::{Value, json};

use super::JsonBody;
use crate::audit::RequestMeta;
use crate::cache::{cache_aside, invalidate};
use crate::error::storage_error;
use crate::server::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    BearerAuth(ctx): BearerAuth,
) -> Result<ApiResponse<Value>, ApiError> {
    let user_id = ctx.user_id();
    let profile = cache_aside(
        state.cache.as_ref(),
        &keys::user_profile(user_id),
        state.cache_config.profile_ttl,
        || state.storage.find_profile(user_id),
    )
    .await
    .map_err(storage_error)?
    .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(ApiResponse::ok(
        "User profile retrieved successfully",
        json!({ "profile": profile }),
    ))
}

pub async fn create_profile(
    State(state): State<AppState>,
    meta: RequestMeta,
    BearerAuth(ctx): BearerAuth,
    JsonBody(changes): JsonBody<ProfileChanges>,
) -> Result<ApiResponse<Value>, ApiError> {
    let user_id = ctx.user_id();
    if state
        .storage
        .find_profile(user_id)
        .await
        .map_err(storage_error)?
        .is_some()
    {
        return Err(ApiError::bad_request("Profile already exists"));
    }

    let profile = state
        .storage
        .create_profile(user_id, changes)
        .await
        .map_err(storage_error)?;

    invalidate(state.cache.as_ref(), &keys::user_profile(user_id)).await;
    state
        .audit
        .record(user_id, AuditAction::ProfileCreate, profile.id, &meta)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse::created(
        "User profile created successfully",
        json!({ "profile": profile }),
    ))
}

/// Partial update: fields absent from the body keep their stored value.
pub async fn update_profile(
    State(state): State<AppState>,
    meta: RequestMeta,
    BearerAuth(ctx): BearerAuth,
    JsonBody(changes): JsonBody<ProfileChanges>,
) -> Result<ApiResponse<Value>, ApiError> {
    let user_id = ctx.user_id();
    let profile = state
        .storage
        .update_profile(user_id, changes)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                ApiError::not_found("Profile not found")
            } else {
                storage_error(e)
            }
        })?;

    invalidate(state.cache.as_ref(), &keys::user_profile(user_id)).await;
    state
        .audit
        .record(user_id, AuditAction::ProfileUpdate, profile.id, &meta)
        .await
        .map_err(storage_error)?;

    Ok(ApiResponse::ok(
        "User profile updated successfully",
        json!({ "profile": profile }),
    ))
}
