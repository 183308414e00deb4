//! Error response handling for authentication extractors.

use axum::response::{IntoResponse, Response};
use folio_api::ApiError;

use crate::error::AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::InvalidToken { reason } = &self {
            tracing::debug!(%reason, "rejected access token");
        }
        ApiError::from(self).into_response()
    }
}
