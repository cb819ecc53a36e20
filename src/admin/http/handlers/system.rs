//! Health, metrics, client configuration and fallback handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use super::super::types::{ClientConfigResponse, HealthResponse};
use super::super::{AppError, SharedState, metrics};
use crate::constants::{DELIVERY_BASE_URL, HEALTH_STATUS_READY};

/// GET /health - Liveness check.
pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HEALTH_STATUS_READY.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /metrics - Prometheus exposition, 404 when metrics are disabled.
pub(crate) async fn metrics_text(State(state): State<SharedState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => AppError::NotFound("Metrics are disabled".to_string()).into_response(),
    }
}

/// GET /api/config - Public settings for building delivery URLs.
pub(crate) async fn client_config(State(state): State<SharedState>) -> Json<ClientConfigResponse> {
    metrics::record_operation("config", "get");
    Json(ClientConfigResponse {
        success: true,
        account_hash: state.images.account_hash().to_string(),
        delivery_base: DELIVERY_BASE_URL.to_string(),
        variants: state.images.variants().to_vec(),
    })
}

/// Fallback for unknown routes.
pub(crate) async fn not_found() -> (StatusCode, Json<super::super::types::ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(super::super::types::ErrorResponse {
            error: "Not found".to_string(),
            details: None,
        }),
    )
}
