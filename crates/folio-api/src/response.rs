//! Uniform response envelope.
//!
//! Every body the server returns has the shape
//! `{"success": bool, "status": "success"|"error"|"fail", "message": string, "data": object|null}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Value of the envelope's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub status: ResponseStatus,
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    #[must_use]
    pub fn success(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            status: ResponseStatus::Success,
            message: message.into(),
            data,
        }
    }
}

impl Envelope<serde_json::Value> {
    /// Envelope for a failed request. `data` is always `null`.
    #[must_use]
    pub fn failure(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status,
            message: message.into(),
            data: None,
        }
    }
}

/// A successful response: HTTP status plus an envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `200 OK` carrying `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::success(message, Some(data)),
        }
    }

    /// `201 Created` carrying `data`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope::success(message, Some(data)),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl ApiResponse<serde_json::Value> {
    /// `200 OK` with `data: null`.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope::success(message, None),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
