pub mod app;
pub mod core;
pub mod notifications;
pub mod queue;
pub mod server;

include!(concat!(env!("OUT_DIR"), "/version.rs"));
