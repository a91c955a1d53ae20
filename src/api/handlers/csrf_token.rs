use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::api::{error::ApiError, AppState};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

/// Mint a cookie/token pair for the double-submit check. Clients call this
/// before any protected mutating request and echo the token back in the
/// `CSRF-Token` header.
#[utoipa::path(
    get,
    path = "/api/csrf-token",
    responses(
        (status = 200, description = "Fresh CSRF token, paired cookie set", body = CsrfTokenResponse)
    ),
    tag = "auth"
)]
pub async fn csrf_token(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<(HeaderMap, Json<CsrfTokenResponse>), ApiError> {
    let (cookie, token) = state.csrf.mint().map_err(|err| {
        error!("Failed to mint csrf cookie: {err}");
        ApiError::Internal
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((headers, Json(CsrfTokenResponse { csrf_token: token })))
}
