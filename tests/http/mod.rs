//! HTTP Integration Test Modules

pub mod config;
pub mod middleware;
pub mod queue_endpoints;
pub mod websocket;
