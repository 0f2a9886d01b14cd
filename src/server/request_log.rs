//! Access logging

use crate::server::rate_limit::client_ip;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;

/// Log `METHOD PATH | STATUS | LATENCY | CLIENT_IP` for every request
pub async fn log_requests(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client = client_ip(&request);

    let response = next.run(request).await;

    log::info!(
        "{method} {path} | {} | {:?} | {client}",
        response.status().as_u16(),
        started.elapsed()
    );
    response
}
