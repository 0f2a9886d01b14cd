//! Route table and middleware stack

use crate::server::state::AppState;
use crate::server::{handlers, rate_limit, request_log, session, websocket};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, ORIGIN};
use axum::http::Method;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Cross-origin policy for browser clients served from elsewhere
///
/// Credentials are allowed, so the caller's origin is echoed back instead
/// of a wildcard.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ORIGIN, CONTENT_TYPE])
        .expose_headers([CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}

/// Build the application router
///
/// Middleware runs outermost first: request logging, CORS, rate
/// limiting, then session handling. With a `static_dir`, `/` serves its
/// `index.html` and `/static` serves the directory itself.
pub fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/queue/status", get(handlers::queue_status))
        .route("/queue/join", post(handlers::join_queue))
        .route("/queue/advance", post(handlers::advance_queue))
        .route("/ws", get(websocket::websocket_handler));

    let mut router = Router::new().nest("/api", api);
    if let Some(dir) = static_dir {
        router = router
            .route_service("/", ServeFile::new(dir.join("index.html")))
            .nest_service("/static", ServeDir::new(dir));
    }

    router
        .layer(from_fn_with_state(state.clone(), session::session_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit_middleware,
        ))
        .layer(cors_layer())
        .layer(from_fn(request_log::log_requests))
        .with_state(state)
}
