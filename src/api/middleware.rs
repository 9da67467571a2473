//! Request guards: API-key authentication for `/actions/*` and DNS-rebinding
//! protection for `/mcp`.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

use super::{handlers::ApiError, AppState};
use crate::config::TransportSecurity;

pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Authentication middleware for the action facade.
///
/// Answers 503 when no key is configured, 401 when the header is missing or
/// does not match.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.api_key.as_deref() else {
        tracing::warn!("Action request refused: ACTION_PROXY_API_KEY is not set");
        return ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Proxy API key is not configured")
            .into_response();
    };

    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .filter(|value| !value.is_empty());

    match provided {
        None => {
            tracing::warn!("Missing {} header", API_KEY_HEADER);
            ApiError::new(StatusCode::UNAUTHORIZED, "Missing X-Api-Key header").into_response()
        }
        Some(value) if keys_match(value.as_bytes(), expected.as_bytes()) => {
            next.run(request).await
        }
        Some(_) => {
            tracing::warn!("Invalid API key provided");
            ApiError::new(StatusCode::UNAUTHORIZED, "Invalid API key").into_response()
        }
    }
}

/// Compare digests of both keys without short-circuiting, so timing does
/// not reveal how much of the key matched.
fn keys_match(provided: &[u8], expected: &[u8]) -> bool {
    let provided = Sha256::digest(provided);
    let expected = Sha256::digest(expected);
    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Host/Origin allow-listing for the streamable HTTP endpoint.
pub async fn transport_guard(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match check_transport(&state.config.transport, request.headers()) {
        Ok(()) => next.run(request).await,
        Err((status, message)) => (status, message).into_response(),
    }
}

fn check_transport(
    security: &TransportSecurity,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, &'static str)> {
    if !security.enabled {
        return Ok(());
    }

    let host = headers.get(header::HOST).and_then(|h| h.to_str().ok());
    if !host.is_some_and(|host| security.allowed_hosts.iter().any(|allowed| allowed == host)) {
        tracing::warn!(?host, "Rejected MCP request with unexpected Host header");
        return Err((StatusCode::MISDIRECTED_REQUEST, "Invalid Host header"));
    }

    if let Some(origin) = headers.get(header::ORIGIN).and_then(|h| h.to_str().ok()) {
        if !security.allowed_origins.iter().any(|allowed| allowed == origin) {
            tracing::warn!(origin, "Rejected MCP request with unexpected Origin header");
            return Err((StatusCode::FORBIDDEN, "Invalid Origin header"));
        }
    }
    Ok(())
}
