//! Registration, login and session endpoints.

use axum::extract::State;
use folio_api::{ApiError, ApiResponse};
use folio_auth::password::{hash_password_async, verify_password_async};
use folio_auth::BearerAuth;
use folio_storage::{AuditAction, NewUser};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{JsonBody, non_blank};
use crate::audit::RequestMeta;
use crate::error::{cache_error, storage_error};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    let (Some(email), Some(password), Some(username), Some(first_name), Some(last_name)) = (
        non_blank(body.email),
        body.password.filter(|v| !v.is_empty()),
        non_blank(body.username),
        non_blank(body.first_name),
        non_blank(body.last_name),
    ) else {
        return Err(ApiError::bad_request("All required fields must be provided"));
    };

    if state
        .storage
        .find_user_by_email(&email)
        .await
        .map_err(storage_error)?
        .is_some()
    {
        return Err(ApiError::bad_request("Email already exists"));
    }
    if state
        .storage
        .find_user_by_username(&username)
        .await
        .map_err(storage_error)?
        .is_some()
    {
        return Err(ApiError::bad_request("Username already exists"));
    }

    let password_hash = hash_password_async(password).await?;
    let user = state
        .storage
        .create_user(NewUser {
            email,
            username,
            password_hash,
            first_name,
            last_name,
        })
        .await
        .map_err(storage_error)?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::created(
        "User registered successfully",
        json!({ "user": user }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    meta: RequestMeta,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<ApiResponse<Value>, ApiError> {
    let (Some(email), Some(password)) = (
        non_blank(body.email),
        body.password.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "email and password required fields must be provided",
        ));
    };

    let user = state
        .storage
        .find_user_by_email(&email)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !verify_password_async(password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "login rejected: wrong password");
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    let session_id = state.auth.issuer.issue_refresh_session(user.id).await?;
    let access_token = state.auth.issuer.issue_access_token(user.id, session_id)?;

    state
        .audit
        .record(user.id, AuditAction::UserLogin, user.id, &meta)
        .await
        .map_err(storage_error)?;
    state
        .auth
        .identities
        .put(&user)
        .await
        .map_err(cache_error)?;

    tracing::info!(user_id = %user.id, %session_id, "user logged in");
    Ok(ApiResponse::ok(
        "User logged in successfully",
        json!({
            "user": user,
            "meta": { "access_token": access_token, "sessionId": session_id },
        }),
    ))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    BearerAuth(ctx): BearerAuth,
) -> Result<ApiResponse<Value>, ApiError> {
    let access_token = state
        .auth
        .issuer
        .refresh_access_token(ctx.user_id(), ctx.session_id)
        .await?;

    Ok(ApiResponse::ok(
        "Access token refreshed successfully",
        json!({ "meta": { "access_token": access_token } }),
    ))
}

pub async fn user_profile(BearerAuth(ctx): BearerAuth) -> ApiResponse<Value> {
    ApiResponse::ok(
        "User profile retrieved successfully",
        json!({ "user": ctx.user }),
    )
}

/// Closes the caller's session. Other sessions of the same user stay open.
pub async fn logout(
    State(state): State<AppState>,
    meta: RequestMeta,
    BearerAuth(ctx): BearerAuth,
) -> Result<ApiResponse<Value>, ApiError> {
    let user_id = ctx.user_id();
    state
        .audit
        .record(user_id, AuditAction::UserLogout, user_id, &meta)
        .await
        .map_err(storage_error)?;
    state
        .auth
        .sessions()
        .delete(user_id, ctx.session_id)
        .await
        .map_err(cache_error)?;

    tracing::info!(%user_id, session_id = %ctx.session_id, "user logged out");
    Ok(ApiResponse::message("User logged out successfully"))
}
