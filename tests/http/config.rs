//! Configuration file layering tests
//!
//! These point HOME/XDG_CONFIG_HOME at a temporary directory, so they run
//! serially.

use clap::Parser;
use serial_test::serial;
use std::fs;
use std::net::SocketAddr;
use waitline::app::cli::config::default_config_path;
use waitline::app::cli::{Args, Settings};

struct ConfigHome {
    _dir: tempfile::TempDir,
    saved: Vec<(&'static str, Option<String>)>,
}

impl ConfigHome {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let saved = ["HOME", "XDG_CONFIG_HOME"]
            .into_iter()
            .map(|key| (key, std::env::var(key).ok()))
            .collect();
        unsafe {
            std::env::set_var("HOME", dir.path());
            std::env::set_var("XDG_CONFIG_HOME", dir.path().join(".config"));
        }
        Self { _dir: dir, saved }
    }
}

impl Drop for ConfigHome {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

#[tokio::test]
#[serial]
#[cfg(target_os = "linux")]
async fn test_default_config_file_is_picked_up() {
    let _home = ConfigHome::new();
    let path = default_config_path().unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "rate-limit = 7\nbind = \"127.0.0.1:7000\"\n").unwrap();

    let settings = Settings::load(Args::try_parse_from(["waitline"]).unwrap())
        .await
        .unwrap();
    assert_eq!(settings.rate_limit, 7);
    assert_eq!(settings.bind, "127.0.0.1:7000".parse::<SocketAddr>().unwrap());

    let settings = Settings::load(Args::try_parse_from(["waitline", "--rate-limit", "9"]).unwrap())
        .await
        .unwrap();
    assert_eq!(settings.rate_limit, 9);
}

#[tokio::test]
#[serial]
#[cfg(target_os = "linux")]
async fn test_absent_default_config_uses_defaults() {
    let _home = ConfigHome::new();
    let settings = Settings::load(Args::default()).await.unwrap();
    assert_eq!(settings, Settings::default());
}
