use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::api::{auth::middleware::extract_bearer_token, AppState};

/// Let the SPA check whether its stored bearer token is still usable.
#[utoipa::path(
    get,
    path = "/api/verify-token",
    responses(
        (status = 200, description = "Token is valid"),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    tag = "auth"
)]
pub async fn verify_token(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(token) = extract_bearer_token(&headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "No token provided" })),
        );
    };

    match state.tokens.verify(&token) {
        Ok(_claims) => (StatusCode::OK, Json(json!({ "valid": true }))),
        Err(err) => {
            debug!("Token verification failed: {err}");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Invalid or expired token" })),
            )
        }
    }
}
