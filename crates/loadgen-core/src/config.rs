use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Lowest accepted target rate in requests per second.
pub const MIN_RPS: u32 = 1;
/// Highest accepted target rate in requests per second.
pub const MAX_RPS: u32 = 1000;

/// Configuration for a single load run, immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target request rate in requests per second
    pub rps: u32,
    /// Absolute URL the generated GETs are issued against
    pub target: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rps must be between {MIN_RPS} and {MAX_RPS}, got {0}")]
    RateOutOfRange(u32),
    #[error("target must be an absolute http(s) URL: {0}")]
    InvalidTarget(String),
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RPS..=MAX_RPS).contains(&self.rps) {
            return Err(ConfigError::RateOutOfRange(self.rps));
        }
        let url = Url::parse(&self.target)
            .map_err(|_| ConfigError::InvalidTarget(self.target.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidTarget(self.target.clone()));
        }
        Ok(())
    }

    /// Interval between dispatch attempts: 1 second divided by the rate.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / self.rps.max(MIN_RPS)
    }
}

/// Engine settings shared by every run, loadable from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Address the admin API binds to (e.g., "0.0.0.0:8002")
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum concurrent in-flight requests
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Ceiling on how long a stop call waits for the drain, in milliseconds
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

fn default_bind() -> String {
    "0.0.0.0:8002".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_in_flight() -> usize {
    100
}

fn default_stop_grace_ms() -> u64 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            timeout_ms: default_timeout_ms(),
            max_in_flight: default_max_in_flight(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;
        Ok(settings)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}
