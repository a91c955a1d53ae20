//! Request gates for protected routes.
//!
//! The bearer-token gate and the CSRF gate are independent: a mutating
//! request must pass both, and neither substitutes for the other. Both skip
//! read-only methods and exempt the login route, which is authenticated by
//! credentials alone and throttled by the rate limiter instead.

use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tracing::{debug, error};

use crate::api::{error::ApiError, AppState};

use super::rate_limit::RateLimitDecision;

/// Mutating routes that carry their own authentication. Login cannot require
/// a CSRF token because no session exists yet to carry one.
const GATE_EXEMPT_PATHS: &[&str] = &["/api/login"];

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn is_exempt(path: &str) -> bool {
    GATE_EXEMPT_PATHS.contains(&path)
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Gate mutating requests on a valid bearer token; the decoded claims are
/// attached to the request for downstream handlers.
pub async fn require_bearer(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) || is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    let Some(token) = extract_bearer_token(request.headers()) else {
        return ApiError::AuthenticationRequired.into_response();
    };

    match state.tokens.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            debug!("Rejected bearer token: {err}");
            ApiError::InvalidToken.into_response()
        }
    }
}

/// Gate mutating requests on a CSRF token matching the request's own cookie.
pub async fn csrf_guard(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_mutating(request.method()) || is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    match state.csrf.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            debug!("Rejected csrf token: {err}");
            ApiError::InvalidCsrfToken.into_response()
        }
    }
}

/// Throttle login attempts per client address, 5 per 15 minutes.
pub async fn login_rate_limit(
    Extension(state): Extension<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(addr) = client_ip(&request) else {
        error!("Failed to resolve client address for rate limiting");
        return ApiError::Internal.into_response();
    };

    match state.limiter.check(addr).await {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited {
            retry_after_seconds,
        } => {
            debug!("Rate limited login attempt from {addr}");
            ApiError::TooManyRequests {
                retry_after_seconds,
            }
            .into_response()
        }
    }
}

fn client_ip(request: &Request) -> Option<IpAddr> {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}
