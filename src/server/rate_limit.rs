//! Per-client fixed-window rate limiting
//!
//! Each client IP may make `limit` requests per window. A background task
//! clears all counters when the window rolls over.

use crate::core::sync::handle_mutex_poison;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

pub struct RateLimiter {
    limit: u32,
    requests: Mutex<HashMap<String, u32>>,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request from `client`; false once the window's budget is spent
    pub fn check(&self, client: &str) -> Result<bool, ApiError> {
        let mut requests = handle_mutex_poison(self.requests.lock(), ApiError::Internal)?;
        let count = requests.entry(client.to_string()).or_insert(0);
        if *count >= self.limit {
            return Ok(false);
        }
        *count += 1;
        Ok(true)
    }

    /// Start a new window for every client
    pub fn reset(&self) -> Result<(), ApiError> {
        let mut requests = handle_mutex_poison(self.requests.lock(), ApiError::Internal)?;
        requests.clear();
        Ok(())
    }

    /// Clear the counters every `period` until the limiter is dropped
    pub fn spawn_reset_task(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let limiter = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                if let Err(e) = limiter.reset() {
                    log::error!("Rate limiter reset failed: {e}");
                }
            }
        })
    }
}

/// Best-effort client address for logging and rate limiting
pub fn client_ip(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    match state.rate_limiter.check(&client) {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            log::warn!("Rate limit exceeded for {client}");
            ApiError::RateLimited.into_response()
        }
        Err(e) => e.into_response(),
    }
}
