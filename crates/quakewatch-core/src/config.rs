//! Configuration types for quakewatch.
//!
//! [`Config::load`] reads `~/.config/quakewatch/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies
//! `QUAKEWATCH__SECTION__KEY` environment overrides. [`Config::defaults`]
//! returns the same defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[feed]
url          = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson"
timeout_secs = 30

[poller]
interval_secs     = 15
min_magnitude     = 0.0
sort_by_magnitude = true

[server]
enabled = true
bind    = "0.0.0.0"
port    = 8080

[favorites]
path = "data/favorites.json"
"#;

/// Default USGS endpoint: all earthquakes from the past day.
pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_day.geojson";

const ENV_PREFIX: &str = "QUAKEWATCH";

/// Shortest polling interval a config file or flag can ask for.
pub const MIN_INTERVAL_SECS: u64 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not prepare config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] config::ConfigError),
}

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

/// `[feed]` section: where and how to fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_url() -> String { DEFAULT_FEED_URL.to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_user_agent() -> String { concat!("quakewatch/", env!("CARGO_PKG_VERSION")).to_string() }

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// `[poller]` section: initial runtime settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub min_magnitude: f64,
    #[serde(default = "default_sort_by_magnitude")]
    pub sort_by_magnitude: bool,
}

fn default_interval_secs() -> u64 { 15 }
fn default_sort_by_magnitude() -> bool { true }

impl PollerConfig {
    /// Polling interval, clamped to [`MIN_INTERVAL_SECS`] so `0` cannot turn
    /// the loop into a busy fetch.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_INTERVAL_SECS))
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            min_magnitude: 0.0,
            sort_by_magnitude: default_sort_by_magnitude(),
        }
    }
}

/// `[server]` section: the `/status` listener.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_enabled() -> bool { true }
fn default_bind() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `bind:port`, ready for a socket address parse or `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// `[favorites]` section: where the pinned quake ids live.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoritesConfig {
    #[serde(default = "default_favorites_path")]
    pub path: PathBuf,
}

fn default_favorites_path() -> PathBuf { PathBuf::from("data/favorites.json") }

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self { path: default_favorites_path() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/quakewatch/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start()).map_err(|source| {
                ConfigError::Io {
                    path: path.clone(),
                    source,
                }
            })?;
        }

        Self::load_from(&path)
    }

    /// Load an explicit file on top of the defaults. A missing file is not
    /// an error; environment overrides still apply.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("quakewatch")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
