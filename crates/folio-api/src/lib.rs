use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

mod response;

pub use response::{ApiResponse, Envelope, ResponseStatus};

/// Message returned to clients for any unexpected failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// Detail of an internal error, attached to the response extensions so that a
/// later layer can decide whether to expose it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

/// High-level API errors mapped to HTTP responses in the uniform envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client error reported with envelope status `error`.
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Client input that failed validation, reported with envelope status `fail`.
    #[error("Validation failed: {0}")]
    Fail(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn fail(msg: impl Into<String>) -> Self {
        Self::Fail(msg.into())
    }
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Fail(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope_status(&self) -> ResponseStatus {
        match self {
            ApiError::Fail(_) => ResponseStatus::Fail,
            _ => ResponseStatus::Error,
        }
    }

    /// Message shown to the client. Internal errors are masked.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Fail(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal(_) => GENERIC_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Envelope::failure(self.envelope_status(), self.public_message());
        let mut response = (status, Json(body)).into_response();

        if let ApiError::Internal(detail) = self {
            tracing::error!(error = %detail, "request failed with internal error");
            response
                .extensions_mut()
                .insert(InternalErrorDetail(detail));
        }

        response
    }
}
