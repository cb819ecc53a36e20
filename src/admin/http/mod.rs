//! Admin HTTP API.
//!
//! Routes:
//! - `GET /health` - liveness check (unauthenticated)
//! - `GET /metrics` - Prometheus text (unauthenticated, when enabled)
//! - `/api/images`, `/api/projects`, `/api/upload`, `/api/config` - CRUD,
//!   behind basic auth when credentials are configured
//!
//! Handlers that touch the image host always do so before touching the
//! catalog, so a failure at the host never leaves a catalog record pointing
//! at a missing asset.

pub mod audit;
pub mod auth;
mod handlers;
pub mod metrics;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, FromRequest, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use super::services::images::{ImageHostError, ImageHostService};
use super::store::{Catalog, StoreError};
use crate::constants::{MAX_UPLOAD_BYTES, REQUEST_TIMEOUT_SECS};
use auth::Credentials;
use types::ErrorResponse;

/// State shared by all handlers.
pub struct AppState {
    pub catalog: Catalog,
    pub images: ImageHostService,
    /// `None` disables authentication.
    pub credentials: Option<Credentials>,
    /// Renders `/metrics` when a Prometheus recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    #[must_use]
    pub fn new(catalog: Catalog, images: ImageHostService) -> Self {
        Self {
            catalog,
            images,
            credentials: None,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    #[must_use]
    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }
}

/// Errors returned by handlers, mapped to status codes and JSON bodies.
#[derive(Debug)]
pub enum AppError {
    /// 400 - missing/duplicate identifier, malformed input.
    BadRequest(String),
    /// 404 - record does not exist.
    NotFound(String),
    /// 500 - image host or database failed; details passed through.
    Upstream {
        message: String,
        details: Option<serde_json::Value>,
    },
    /// 500 - anything else.
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        metrics::record_error(status.as_u16());

        let (error, details) = match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Internal(msg) => (msg, None),
            Self::Upstream { message, details } => (message, details),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), %error, details = ?details, "Request failed");
        } else {
            warn!(status = status.as_u16(), %error, "Request rejected");
        }

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => Self::BadRequest(msg),
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Database(e) => Self::Upstream {
                message: "Database error".to_string(),
                details: Some(serde_json::Value::String(format!("{e:#}"))),
            },
        }
    }
}

impl From<ImageHostError> for AppError {
    fn from(err: ImageHostError) -> Self {
        Self::Upstream {
            message: err.to_string(),
            details: Some(err.details()),
        }
    }
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Builds the admin router over the given state.
pub fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route(
            "/api/images",
            get(handlers::list_images).post(handlers::save_image),
        )
        .route(
            "/api/images/{id}",
            get(handlers::get_image).delete(handlers::delete_image),
        )
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route("/api/projects/reorder", put(handlers::reorder_projects))
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/api/upload", post(handlers::upload))
        .route("/api/config", get(handlers::client_config))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_basic_auth,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_text))
        .merge(api)
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(request_timeout())
        .with_state(state)
}

/// Requests running past [`REQUEST_TIMEOUT_SECS`] are answered with 408.
fn request_timeout() -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(REQUEST_TIMEOUT_SECS),
    )
}

/// Binds `addr` and serves the admin API until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: SharedState, addr: SocketAddr) -> Result<()> {
    if state.credentials.is_none() {
        warn!("No admin credentials configured; the API is open to anyone who can reach it");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Admin API listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Admin server failed")?;

    info!("Admin API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn app(credentials: Option<Credentials>) -> Router {
        let catalog = Catalog::memory().await.unwrap();
        let state = AppState::new(catalog, ImageHostService::memory("hash"))
            .with_credentials(credentials)
            .shared();
        router(state)
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_request_times_out() {
        let slow = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(REQUEST_TIMEOUT_SECS + 1)).await;
                    "late"
                }),
            )
            .layer(request_timeout());
        let response = slow
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_missing_json_content_type_is_bad_request() {
        let response = app(None)
            .await
            .oneshot(
                Request::post("/api/images")
                    .body(Body::from(r#"{"id":"a","cloudflare_id":"b"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_category_is_bad_request() {
        let response = app(None)
            .await
            .oneshot(
                Request::post("/api/projects")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title":"A","category":"interiors"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_auth_applies_to_api_only() {
        let app = app(Some(Credentials {
            username: "editor".to_string(),
            password: "secret".to_string(),
        }))
        .await;

        let response = app
            .clone()
            .oneshot(Request::get("/api/projects").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await["error"],
            "Authentication required"
        );

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_store_errors_map_to_status() {
        let err: AppError = StoreError::Validation("bad".to_string()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err: AppError = StoreError::NotFound("gone".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        let err: AppError = ImageHostError::NotFound("x".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
