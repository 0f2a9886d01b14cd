//! TOML configuration file loading and settings resolution
//!
//! Values are layered: command line over configuration file over built-in
//! defaults. Keys in the file use the long option names (`log-level`,
//! `rate-limit`, ...).

use super::args::Args;
use crate::queue::api::{QueueOptions, DEFAULT_MINUTES_PER_PERSON};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "0.0.0.0:8081";
pub const DEFAULT_RATE_LIMIT: u32 = 60;
pub const DEFAULT_SESSION_MAX_AGE: u64 = 3600;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_FORMAT: &str = "text";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Error reading configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind: SocketAddr,
    pub relay_capacity: Option<usize>,
    pub rate_limit: u32,
    pub session_max_age: u64,
    pub minutes_per_person: u64,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_format: String,
    pub log_file: Option<PathBuf>,
    /// `None` leaves the decision to TTY detection
    pub color: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8081)),
            relay_capacity: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            session_max_age: DEFAULT_SESSION_MAX_AGE,
            minutes_per_person: DEFAULT_MINUTES_PER_PERSON,
            static_dir: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_format: DEFAULT_LOG_FORMAT.to_string(),
            log_file: None,
            color: None,
        }
    }
}

impl Settings {
    /// Load the configuration file (if any) and layer the command line over it
    pub async fn load(cli: Args) -> Result<Self, ConfigError> {
        let mut file_args = Args::default();
        if let Some(path) = config_path(cli.config_file.as_deref())? {
            let contents =
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: path.clone(),
                        source,
                    })?;
            let table = toml::from_str::<toml::Table>(&contents)
                .map_err(|source| ConfigError::Parse { path, source })?;
            Args::apply_toml_values(&mut file_args, &table)?;
        }

        Self::resolve(cli.merge_over(file_args))
    }

    /// Apply defaults to merged arguments and validate the result
    pub fn resolve(args: Args) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        if args.relay_capacity == Some(0) {
            return Err(ConfigError::invalid(
                "relay-capacity",
                "must be greater than 0",
            ));
        }
        if args.rate_limit == Some(0) {
            return Err(ConfigError::invalid("rate-limit", "must be greater than 0"));
        }
        if args.session_max_age == Some(0) {
            return Err(ConfigError::invalid(
                "session-max-age",
                "must be greater than 0",
            ));
        }

        Ok(Self {
            color: args.color_choice(),
            bind: args.bind.unwrap_or(defaults.bind),
            relay_capacity: args.relay_capacity,
            rate_limit: args.rate_limit.unwrap_or(defaults.rate_limit),
            session_max_age: args.session_max_age.unwrap_or(defaults.session_max_age),
            minutes_per_person: args
                .minutes_per_person
                .unwrap_or(defaults.minutes_per_person),
            static_dir: args.static_dir,
            log_level: args.log_level.unwrap_or(defaults.log_level),
            log_format: args.log_format.unwrap_or(defaults.log_format),
            log_file: args.log_file.filter(|p| !is_disabled_path(p)),
        })
    }

    pub fn queue_options(&self) -> QueueOptions {
        QueueOptions {
            relay_capacity: self.relay_capacity,
            minutes_per_person: self.minutes_per_person,
        }
    }
}

/// Decide which configuration file to read
///
/// A file named on the command line must exist; the default location is
/// only used when present.
fn config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    match explicit {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(ConfigError::NotFound(path.to_path_buf())),
        None => Ok(default_config_path().filter(|path| path.exists())),
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Waitline").join("waitline.toml"))
}

// "none" and "-" turn file logging off
fn is_disabled_path(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|s| s.eq_ignore_ascii_case("none") || s == "-")
}

impl Args {
    /// Apply TOML configuration values to Args
    pub fn apply_toml_values(args: &mut Self, config: &toml::Table) -> Result<(), ConfigError> {
        if let Some(bind) = Self::string_value(config, "bind")? {
            let addr = bind
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::invalid("bind", e.to_string()))?;
            args.bind = Some(addr);
        }
        if let Some(capacity) = Self::integer_value(config, "relay-capacity")? {
            args.relay_capacity = Some(capacity as usize);
        }
        if let Some(limit) = Self::integer_value(config, "rate-limit")? {
            let limit = u32::try_from(limit)
                .map_err(|_| ConfigError::invalid("rate-limit", "value is too large"))?;
            args.rate_limit = Some(limit);
        }
        if let Some(age) = Self::integer_value(config, "session-max-age")? {
            args.session_max_age = Some(age);
        }
        if let Some(minutes) = Self::integer_value(config, "minutes-per-person")? {
            args.minutes_per_person = Some(minutes);
        }
        if let Some(dir) = Self::string_value(config, "static-dir")? {
            args.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = Self::string_value(config, "log-level")? {
            match level {
                "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                    args.log_level = Some(level.to_string())
                }
                other => {
                    return Err(ConfigError::invalid(
                        "log-level",
                        format!("unknown level '{other}'"),
                    ))
                }
            }
        }
        if let Some(format) = Self::string_value(config, "log-format")? {
            match format {
                "text" | "ext" | "json" => args.log_format = Some(format.to_string()),
                other => {
                    return Err(ConfigError::invalid(
                        "log-format",
                        format!("unknown format '{other}'"),
                    ))
                }
            }
        }
        if let Some(file) = Self::string_value(config, "log-file")? {
            args.log_file = Some(PathBuf::from(file));
        }
        if let Some(color) = config.get("color").and_then(|v| v.as_bool()) {
            args.color = color;
            args.no_color = !color;
        }
        if let Some(no_color) = config.get("no-color").and_then(|v| v.as_bool()) {
            args.color = !no_color;
            args.no_color = no_color;
        }
        Ok(())
    }

    /// Layer these (command line) arguments over `base` (file) arguments
    pub fn merge_over(self, base: Args) -> Args {
        let (color, no_color) = match self.color_choice() {
            Some(_) => (self.color, self.no_color),
            None => (base.color, base.no_color),
        };
        Args {
            bind: self.bind.or(base.bind),
            config_file: self.config_file.or(base.config_file),
            relay_capacity: self.relay_capacity.or(base.relay_capacity),
            rate_limit: self.rate_limit.or(base.rate_limit),
            session_max_age: self.session_max_age.or(base.session_max_age),
            minutes_per_person: self.minutes_per_person.or(base.minutes_per_person),
            static_dir: self.static_dir.or(base.static_dir),
            log_level: self.log_level.or(base.log_level),
            log_format: self.log_format.or(base.log_format),
            log_file: self.log_file.or(base.log_file),
            color,
            no_color,
        }
    }

    fn string_value<'a>(
        config: &'a toml::Table,
        key: &str,
    ) -> Result<Option<&'a str>, ConfigError> {
        match config.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(key, "expected a string")),
        }
    }

    fn integer_value(config: &toml::Table, key: &str) -> Result<Option<u64>, ConfigError> {
        match config.get(key) {
            None => Ok(None),
            Some(value) => value
                .as_integer()
                .and_then(|n| u64::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(key, "expected a non-negative integer")),
        }
    }
}
