//! Command-line arguments
//!
//! Every option is optional here so that values coming from the
//! configuration file can fill the gaps. Defaults are applied when the
//! merged arguments are resolved into [`Settings`](super::config::Settings).

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(name = "waitline")]
#[command(about = "Virtual waiting-line service with live queue updates")]
#[command(version)]
pub struct Args {
    /// Address to listen on
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Capacity of the broadcast relay channel (unbounded when omitted)
    #[arg(long = "relay-capacity", value_name = "COUNT")]
    pub relay_capacity: Option<usize>,

    /// Requests allowed per client IP per minute
    #[arg(long = "rate-limit", value_name = "COUNT")]
    pub rate_limit: Option<u32>,

    /// Lifetime of the session cookie in seconds
    #[arg(long = "session-max-age", value_name = "SECONDS")]
    pub session_max_age: Option<u64>,

    /// Estimated minutes of waiting per person ahead in the line
    #[arg(long = "minutes-per-person", value_name = "MINUTES")]
    pub minutes_per_person: Option<u64>,

    /// Directory holding index.html and the static assets
    #[arg(short = 's', long = "static-dir", value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored log output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Color preference from the command line: `None` means auto/TTY
    pub fn color_choice(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
