//! Common test utilities for driving the router

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
use waitline::app::cli::Settings;
use waitline::core::shutdown::{wait_for_shutdown, ShutdownSignal};
use waitline::queue::api::QueueManager;
use waitline::server::{build_router, AppState};

pub struct TestServer {
    pub router: Router,
    pub manager: Arc<QueueManager>,
    pub shutdown: ShutdownSignal,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let manager = QueueManager::with_options(settings.queue_options());
        let shutdown = ShutdownSignal::new();
        let state = AppState::new(manager.clone(), &settings, shutdown.clone());
        Self {
            router: build_router(state, settings.static_dir.as_deref()),
            manager,
            shutdown,
        }
    }

    /// Serve the router on an ephemeral local port until shutdown
    pub async fn listen(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let service = self
            .router
            .clone()
            .into_make_service_with_connect_info::<SocketAddr>();
        let stop = wait_for_shutdown(self.shutdown.subscribe());
        tokio::spawn(async move {
            axum::serve(listener, service)
                .with_graceful_shutdown(stop)
                .await
                .unwrap();
        });
        addr
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn send(&self, method: &str, uri: &str, session: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header(COOKIE, format!("session_id={session}"));
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        session: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let response = self.send(method, uri, session).await;
        let status = response.status();
        (status, body_json(response).await)
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .map(|value| value.to_str().unwrap().to_string())
}
