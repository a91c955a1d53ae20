use utoipa::OpenApi;

use crate::{
    api::handlers::{csrf_token, health, login, posts, upload, verify},
    store::Post,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        login::login,
        csrf_token::csrf_token,
        verify::verify_token,
        posts::list_posts,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        upload::upload,
    ),
    components(schemas(
        login::LoginRequest,
        login::LoginResponse,
        csrf_token::CsrfTokenResponse,
        Post,
    )),
    tags(
        (name = "health", description = "Service liveness"),
        (name = "auth", description = "Login, token verification and CSRF"),
        (name = "posts", description = "Blog post management"),
        (name = "uploads", description = "Image uploads")
    )
)]
pub struct ApiDoc;
