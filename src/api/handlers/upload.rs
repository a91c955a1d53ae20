use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::{path::Path, sync::Arc};
use tracing::{debug, error};

use crate::api::{error::ApiError, AppState};

/// Store the uploaded bytes under the uploads directory and return the
/// public URL path. Filenames are prefixed with the current unix epoch in
/// milliseconds so repeated uploads of the same file never collide.
pub(crate) async fn save_image(
    uploads_dir: &Path,
    original_name: &str,
    data: &[u8],
) -> Result<String, ApiError> {
    let filename = format!("{}-{}", Utc::now().timestamp_millis(), sanitize(original_name));
    let path = uploads_dir.join(&filename);

    tokio::fs::write(&path, data).await.map_err(|err| {
        error!("Failed to write upload {}: {err}", path.display());
        ApiError::Internal
    })?;

    Ok(format!("/uploads/{filename}"))
}

// Client-supplied names never become path components.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(|c| c == '.' || c == '_').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[utoipa::path(
    post,
    path = "/api/upload",
    responses(
        (status = 200, description = "Image stored, public URL returned"),
        (status = 400, description = "No image file in the form"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Invalid token or CSRF check failed")
    ),
    tag = "uploads"
)]
pub async fn upload(
    Extension(state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        debug!("Malformed multipart body: {err}");
        ApiError::Validation("Malformed multipart form".to_string())
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field.bytes().await.map_err(|err| {
            debug!("Failed to read upload field: {err}");
            ApiError::Validation("Malformed multipart form".to_string())
        })?;

        if data.is_empty() {
            continue;
        }

        let image_url = save_image(&state.uploads_dir, &original_name, &data).await?;

        return Ok((
            StatusCode::OK,
            Json(json!({ "success": true, "imageUrl": image_url })),
        ));
    }

    Ok((
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": "No image file provided" })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_simple_names() {
        assert_eq!(sanitize("boat.jpg"), "boat.jpg");
        assert_eq!(sanitize("hull-wax_2.png"), "hull-wax_2.png");
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize("a/b\\c.png"), "a_b_c.png");
    }

    #[test]
    fn test_sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize(""), "upload");
        assert_eq!(sanitize("..."), "upload");
    }

    #[tokio::test]
    async fn test_save_image_writes_under_uploads_dir() {
        let dir = tempfile::tempdir().unwrap();

        let url = save_image(dir.path(), "deck.jpg", b"bytes").await.unwrap();

        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-deck.jpg"));

        let filename = url.strip_prefix("/uploads/").unwrap();
        let stored = tokio::fs::read(dir.path().join(filename)).await.unwrap();
        assert_eq!(stored, b"bytes");
    }
}
