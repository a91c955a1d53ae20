//! API error kinds and their JSON responses.
//!
//! Every failure a handler can surface maps to one of these kinds; the
//! response body is always `{"message": ...}` and stack traces never cross
//! the HTTP boundary.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid CSRF token")]
    InvalidCsrfToken,
    #[error("Too many login attempts, please try again later")]
    TooManyRequests { retry_after_seconds: u64 },
    #[error("{0}")]
    Validation(String),
    #[error("Post not found")]
    NotFound,
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::InvalidCsrfToken => StatusCode::FORBIDDEN,
            Self::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "message": self.to_string() }));

        let mut response = (status, body).into_response();

        if let Self::TooManyRequests {
            retry_after_seconds,
        } = self
        {
            if let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}
