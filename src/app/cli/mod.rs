//! Command-line parsing and configuration

pub mod args;
pub mod config;

pub use args::Args;
pub use config::{ConfigError, Settings};
