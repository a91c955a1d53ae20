use axum::{extract::Extension, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

use crate::api::{error::ApiError, AppState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many login attempts")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    if !state
        .credentials
        .verify(&request.username, &request.password)
    {
        debug!("Rejected login attempt");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&request.username).map_err(|err| {
        error!("Failed to issue token: {err}");
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse { token }))
}
