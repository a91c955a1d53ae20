use crate::{
    api::{
        auth::{
            csrf::CSRF_HEADER_NAME, middleware, Credentials, CsrfGuard, LoginRateLimiter,
            TokenService,
        },
        handlers::{csrf_token, health, login, posts, upload, verify},
        openapi::ApiDoc,
    },
    cli::settings::Settings,
    store::PostStore,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath},
    http::{
        header::{
            AUTHORIZATION, CONTENT_TYPE, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
        HeaderName, HeaderValue, Method, Request,
    },
    middleware::from_fn,
    routing::{get, post, put},
    Extension, Router,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    services::ServeDir,
    set_header::{SetRequestHeaderLayer, SetResponseHeaderLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error;
pub mod handlers;
mod openapi;

// Multipart bodies carry images, the default 2 MB limit is too small.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Shared per-process state, handed to handlers and gates via `Extension`.
pub struct AppState {
    pub credentials: Credentials,
    pub tokens: TokenService,
    pub csrf: CsrfGuard,
    pub limiter: LoginRateLimiter,
    pub posts: PostStore,
    pub uploads_dir: PathBuf,
}

impl AppState {
    fn from_settings(settings: &Settings) -> Result<Self> {
        let csrf = CsrfGuard::new(&settings.jwt_secret, settings.cookie_secure())
            .map_err(|err| anyhow!("Failed to key the csrf guard: {err}"))?;

        Ok(Self {
            credentials: Credentials::new(
                settings.admin_username.clone(),
                settings.admin_password.clone(),
            ),
            tokens: TokenService::new(&settings.jwt_secret, settings.token_ttl_hours),
            csrf,
            limiter: LoginRateLimiter::new(),
            posts: PostStore::new(),
            uploads_dir: settings.uploads_dir.clone(),
        })
    }
}

/// Build the full application router. Kept separate from the listener so
/// tests can drive it with `tower::ServiceExt::oneshot`.
pub fn router(settings: &Settings) -> Result<Router> {
    let state = Arc::new(AppState::from_settings(settings)?);

    let origin = frontend_origin(&settings.frontend_url)?;
    let cors = CorsLayer::new()
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(CSRF_HEADER_NAME),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(AllowOrigin::exact(origin))
        .allow_credentials(true);

    let app = Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/login",
            post(login::login).layer(from_fn(middleware::login_rate_limit)),
        )
        .route("/api/csrf-token", get(csrf_token::csrf_token))
        .route("/api/verify-token", get(verify::verify_token))
        .route(
            "/api/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/api/posts/:id",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route("/api/upload", post(upload::upload))
        .nest_service("/uploads", ServeDir::new(&settings.uploads_dir))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(SetResponseHeaderLayer::if_not_present(
                    X_FRAME_OPTIONS,
                    HeaderValue::from_static("SAMEORIGIN"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    REFERRER_POLICY,
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(cors)
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(Extension(state))
                // Gates are method-aware and skip read-only requests, see auth::middleware.
                .layer(from_fn(middleware::csrf_guard))
                .layer(from_fn(middleware::require_bearer)),
        );

    Ok(app)
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(settings: Settings) -> Result<()> {
    let port = settings.port;
    let app = router(&settings)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on [::]:{}", port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Gracefully shutdown");
    })
    .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_url: &str) -> Result<HeaderValue> {
    let parsed =
        Url::parse(frontend_url).with_context(|| format!("Invalid frontend URL: {frontend_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("Frontend URL must include a valid host: {frontend_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontend_origin_strips_path() {
        let origin = frontend_origin("http://localhost:5173/admin").unwrap();
        assert_eq!(origin, HeaderValue::from_static("http://localhost:5173"));
    }

    #[test]
    fn test_frontend_origin_without_port() {
        let origin = frontend_origin("https://deckside.example.com").unwrap();
        assert_eq!(
            origin,
            HeaderValue::from_static("https://deckside.example.com")
        );
    }

    #[test]
    fn test_frontend_origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
        assert!(frontend_origin("mailto:crew@deckside.example.com").is_err());
    }
}
