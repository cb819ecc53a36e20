//! HTTP basic authentication for the `/api` routes.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::net::SocketAddr;
use subtle::ConstantTimeEq;

use super::SharedState;
use super::audit::{AuditEvent, log_audit_event};

/// Admin username and password.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Constant-time check of a username/password pair.
    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = self.username.as_bytes().ct_eq(username.as_bytes());
        let pass_ok = self.password.as_bytes().ct_eq(password.as_bytes());
        (user_ok & pass_ok).into()
    }
}

/// Extracts `(username, password)` from an `Authorization: Basic` header.
fn parse_basic(headers: &HeaderMap) -> Result<(String, String), &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing authorization header")?
        .to_str()
        .map_err(|_| "authorization header is not ASCII")?;
    let encoded = value
        .strip_prefix("Basic ")
        .ok_or("authorization scheme is not Basic")?;
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| "invalid base64 credentials")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "credentials are not UTF-8")?;
    let (user, pass) = decoded
        .split_once(':')
        .ok_or("credentials missing ':' separator")?;
    Ok((user.to_string(), pass.to_string()))
}

fn challenge() -> Response {
    let mut response = (
        StatusCode::UNAUTHORIZED,
        axum::Json(super::types::ErrorResponse {
            error: "Authentication required".to_string(),
            details: None,
        }),
    )
        .into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"folio admin\", charset=\"UTF-8\""),
    );
    response
}

/// Middleware rejecting requests without valid admin credentials.
///
/// A state without configured credentials lets everything through; the
/// server warns about that at startup.
pub async fn require_basic_auth(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.credentials.as_ref() else {
        return next.run(request).await;
    };

    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);

    match parse_basic(request.headers()) {
        Ok((user, pass)) if expected.matches(&user, &pass) => next.run(request).await,
        Ok(_) => {
            log_audit_event(AuditEvent::AuthFailure {
                remote_addr,
                reason: "invalid credentials".to_string(),
            });
            challenge()
        },
        Err(reason) => {
            log_audit_event(AuditEvent::AuthFailure {
                remote_addr,
                reason: reason.to_string(),
            });
            challenge()
        },
    }
}
