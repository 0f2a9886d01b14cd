//! Shared state handed to every handler and middleware

use crate::app::cli::Settings;
use crate::core::shutdown::ShutdownSignal;
use crate::queue::api::QueueManager;
use crate::server::rate_limit::RateLimiter;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<QueueManager>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Lifetime of newly issued session cookies, in seconds
    pub session_max_age: u64,
    /// Closes open WebSockets when the server stops
    pub shutdown: ShutdownSignal,
}

impl AppState {
    pub fn new(manager: Arc<QueueManager>, settings: &Settings, shutdown: ShutdownSignal) -> Self {
        Self {
            manager,
            rate_limiter: Arc::new(RateLimiter::new(settings.rate_limit)),
            session_max_age: settings.session_max_age,
            shutdown,
        }
    }
}
