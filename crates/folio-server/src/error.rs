//! Error mapping for handlers and the central error middleware.

use axum::Json;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use folio_api::{ApiError, Envelope, InternalErrorDetail, ResponseStatus};
use folio_storage::{CacheError, StorageError};

use crate::config::Environment;

/// Maps a storage failure to the API error a client sees.
///
/// Unique violations that slip past a handler's pre-check still report which
/// field collided.
pub fn storage_error(err: StorageError) -> ApiError {
    match err {
        StorageError::NotFound { entity, .. } => {
            ApiError::not_found(format!("{} not found", capitalize(entity)))
        }
        StorageError::Conflict { field, message } => match field.as_str() {
            "email" => ApiError::bad_request("Email already exists"),
            "username" => ApiError::bad_request("Username already exists"),
            "user_id" => ApiError::bad_request("Profile already exists"),
            _ => ApiError::bad_request(message),
        },
        StorageError::InvalidInput(message) => ApiError::bad_request(message),
        err @ (StorageError::Connection(_) | StorageError::Internal(_)) => {
            ApiError::internal(err.to_string())
        }
    }
}

pub fn cache_error(err: CacheError) -> ApiError {
    ApiError::internal(err.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rewrites the message of internal errors with their detail in development.
///
/// Production responses keep the generic message.
pub async fn expose_internal_errors(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if !environment.is_development() {
        return response;
    }
    let Some(InternalErrorDetail(detail)) = response.extensions().get::<InternalErrorDetail>().cloned()
    else {
        return response;
    };

    let status = response.status();
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    let body = Json(Envelope::failure(ResponseStatus::Error, detail));
    let mut rebuilt = (status, body).into_response();
    for (name, value) in &parts.headers {
        if !rebuilt.headers().contains_key(name) {
            rebuilt.headers_mut().insert(name.clone(), value.clone());
        }
    }
    rebuilt
}
