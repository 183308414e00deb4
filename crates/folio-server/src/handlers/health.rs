use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::server::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    storage: Option<&'static str>,
}

pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            storage: None,
        }),
    )
}

/// Ready once both the store and the cache answer.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.storage.backend_name();
    if let Err(e) = state.storage.health_check().await {
        tracing::warn!(error = %e, backend, "storage not ready");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                storage: Some(backend),
            }),
        );
    }
    if let Err(e) = state.cache.ping().await {
        tracing::warn!(error = %e, "cache not ready");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable",
                storage: Some(backend),
            }),
        );
    }
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ready",
            storage: Some(backend),
        }),
    )
}
