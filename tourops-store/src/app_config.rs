use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    #[default]
    Http,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub mode: BackendMode,
    pub base_url: String,
    pub api_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// JSON fixture loaded in memory mode
    pub seed_path: Option<PathBuf>,
}

fn default_timeout() -> u64 { 10 }

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Seen-alert store. Without a url the service keeps it in process memory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RedisConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AlertsConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "default_low_occupancy")]
    pub low_occupancy_threshold: f64,
    #[serde(default = "default_lookahead_days")]
    pub occupancy_lookahead_days: i64,
    #[serde(default = "default_window_hours")]
    pub imminent_hours: i64,
    #[serde(default = "default_window_hours")]
    pub pending_stale_hours: i64,
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
}

fn default_poll_interval() -> u64 { 30 }
fn default_low_occupancy() -> f64 { 0.3 }
fn default_lookahead_days() -> i64 { 7 }
fn default_window_hours() -> i64 { 24 }
fn default_feed_limit() -> usize { 10 }

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            low_occupancy_threshold: default_low_occupancy(),
            occupancy_lookahead_days: default_lookahead_days(),
            imminent_hours: default_window_hours(),
            pending_stale_hours: default_window_hours(),
            feed_limit: default_feed_limit(),
        }
    }
}

impl AlertsConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TOUROPS__BACKEND__BASE_URL=http://...`
            .add_source(config::Environment::with_prefix("TOUROPS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
