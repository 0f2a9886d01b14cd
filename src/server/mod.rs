//! HTTP and WebSocket surface over the queue manager
//!
//! Handlers reach the core only through `QueueManager`'s public
//! operations and the notification subscription API.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod request_log;
pub mod router;
pub mod session;
pub mod state;
pub mod websocket;

pub use router::build_router;
pub use state::AppState;
