//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/beacon/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/beacon/` (~/.config/beacon/)
//! - Data: `$XDG_DATA_HOME/beacon/` (~/.local/share/beacon/)
//! - State/Logs: `$XDG_STATE_HOME/beacon/` (~/.local/state/beacon/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Telemetry pipeline configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

/// Telemetry pipeline configuration
///
/// Controls batching, dispatch scheduling, retry behavior, and the
/// bounded offline queue used when delivery keeps failing.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// Ingestion server URL (e.g., `https://ingest.example.com`)
    pub server_url: Option<String>,

    /// API key sent as a bearer token
    pub api_key: Option<String>,

    /// Client ID sent with every request
    pub client_id: Option<String>,

    /// Events per batch; reaching this count dispatches immediately
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Milliseconds between scheduled dispatches (must be > 0)
    #[serde(default = "default_batch_interval_ms")]
    pub batch_interval_ms: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max retry attempts after the initial send of a batch
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial backoff delay in milliseconds; doubles after every failure
    #[serde(default = "default_initial_retry_delay_ms")]
    pub initial_retry_delay_ms: u64,

    /// Persist undeliverable batches to the offline queue
    #[serde(default = "default_offline_enabled")]
    pub offline_enabled: bool,

    /// Maximum events held in the offline queue (oldest evicted first)
    #[serde(default = "default_offline_capacity")]
    pub offline_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            api_key: None,
            client_id: None,
            batch_size: default_batch_size(),
            batch_interval_ms: default_batch_interval_ms(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_retry_delay_ms(),
            offline_enabled: default_offline_enabled(),
            offline_capacity: default_offline_capacity(),
        }
    }
}

impl TelemetryConfig {
    /// Check whether the config can reach a server (URL present)
    pub fn is_ready(&self) -> bool {
        self.server_url.is_some()
    }

    /// Validate the pipeline invariants.
    ///
    /// The server URL is deliberately not required here; it is a transport
    /// concern checked by `HttpTransport::new`.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config(
                "telemetry.batch_size must be at least 1".to_string(),
            ));
        }
        if self.batch_interval_ms == 0 {
            return Err(Error::Config(
                "telemetry.batch_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.initial_retry_delay_ms == 0 {
            return Err(Error::Config(
                "telemetry.initial_retry_delay_ms must be greater than 0".to_string(),
            ));
        }
        if self.offline_capacity == 0 {
            return Err(Error::Config(
                "telemetry.offline_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_batch_size() -> usize {
    20
}

fn default_batch_interval_ms() -> u64 {
    10_000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_retry_delay_ms() -> u64 {
    500
}

fn default_offline_enabled() -> bool {
    true
}

fn default_offline_capacity() -> usize {
    100
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/beacon/config.toml` (~/.config/beacon/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("beacon").join("config.toml")
    }

    /// Returns the data directory path (for the offline queue database)
    ///
    /// `$XDG_DATA_HOME/beacon/` (~/.local/share/beacon/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("beacon")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/beacon/` (~/.local/state/beacon/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("beacon")
    }

    /// Returns the offline queue database path
    ///
    /// `$XDG_DATA_HOME/beacon/queue.db` (~/.local/share/beacon/queue.db)
    pub fn queue_path() -> PathBuf {
        Self::data_dir().join("queue.db")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/beacon/beacon.log` (~/.local/state/beacon/beacon.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("beacon.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path
    /// behavior before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_DATA_HOME").is_err() {
            std::env::set_var("XDG_DATA_HOME", home.join(".local/share"));
        }

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
