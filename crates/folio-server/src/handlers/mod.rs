//! HTTP handlers, one module per resource.

pub mod audit_log;
pub mod auth;
pub mod health;
pub mod profile;
pub mod project;

use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::extract::rejection::JsonRejection;
use axum::http::Uri;
use folio_api::ApiError;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// JSON request body whose rejection is rendered in the response envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// Parses an id path segment. Ids that are not UUIDs cannot exist, so they are
/// reported with the entity's not-found message.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found))
}

/// Treats absent and blank strings alike.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Can't find {} on this server!", uri.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_maps_garbage_to_not_found() {
        let err = parse_id("nope", "Project not found").unwrap_err();
        assert_eq!(err.public_message(), "Project not found");
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "x").unwrap(), id);
    }

    #[test]
    fn non_blank_rejects_blank() {
        assert_eq!(non_blank(Some("a".into())).as_deref(), Some("a"));
        assert!(non_blank(Some("  ".into())).is_none());
        assert!(non_blank(None).is_none());
    }
}
