use axum::{
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::{
    api::{error::ApiError, handlers::upload, AppState},
    store::{NewPost, Post, PostPatch},
};

/// Fields carried by the multipart post forms. Create and update share the
/// same shape; update treats every field as optional.
#[derive(Debug, Default)]
struct PostForm {
    title: Option<String>,
    content: Option<String>,
    author: Option<String>,
    category: Option<String>,
    image_url: Option<String>,
}

async fn read_post_form(state: &AppState, mut multipart: Multipart) -> Result<PostForm, ApiError> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        debug!("Malformed multipart body: {err}");
        ApiError::Validation("Malformed multipart form".to_string())
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let Some(original_name) = field.file_name().map(str::to_string) else {
                continue;
            };

            let data = field.bytes().await.map_err(|err| {
                debug!("Failed to read image field: {err}");
                ApiError::Validation("Malformed multipart form".to_string())
            })?;

            if !data.is_empty() {
                form.image_url =
                    Some(upload::save_image(&state.uploads_dir, &original_name, &data).await?);
            }

            continue;
        }

        let value = field.text().await.map_err(|err| {
            debug!("Failed to read form field {name}: {err}");
            ApiError::Validation("Malformed multipart form".to_string())
        })?;

        match name.as_str() {
            "title" => form.title = Some(value),
            "content" => form.content = Some(value),
            "author" => form.author = Some(value),
            "category" => form.category = Some(value),
            _ => {}
        }
    }

    Ok(form)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "All posts, newest first", body = [Post])
    ),
    tag = "posts"
)]
pub async fn list_posts(Extension(state): Extension<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(state.posts.list().await)
}

#[utoipa::path(
    post,
    path = "/api/posts",
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Invalid token or CSRF check failed")
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(state): Extension<Arc<AppState>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let form = read_post_form(&state, multipart).await?;

    let (Some(title), Some(content)) = (non_empty(form.title), non_empty(form.content)) else {
        return Err(ApiError::Validation(
            "Title and content are required".to_string(),
        ));
    };

    let Some(author) = non_empty(form.author) else {
        return Err(ApiError::Validation("Author is required".to_string()));
    };

    let post = state
        .posts
        .create(NewPost {
            title,
            content,
            author,
            category: non_empty(form.category),
            image_url: form.image_url,
        })
        .await;

    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Invalid token or CSRF check failed"),
        (status = 404, description = "No post with that id")
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<Post>, ApiError> {
    let form = read_post_form(&state, multipart).await?;

    let patch = PostPatch {
        title: non_empty(form.title),
        content: non_empty(form.content),
        author: non_empty(form.author),
        category: non_empty(form.category),
        image_url: form.image_url,
    };

    match state.posts.update(id, patch).await {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::NotFound),
    }
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    params(
        ("id" = Uuid, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post deleted"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Invalid token or CSRF check failed"),
        (status = 404, description = "No post with that id")
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    if !state.posts.delete(id).await {
        return Err(ApiError::NotFound);
    }

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
