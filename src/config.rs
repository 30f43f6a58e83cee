//! Configuration loading for the tracker and its demo driver.
//!
//! All tunables are centralized here and loaded from `conf/config.toml` if
//! present. Any missing or invalid entries fall back to sensible defaults so
//! the driver can always run.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tracker configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct TrackerConfig {
    /// Fixed vertical offset of the reference line, typically the height of
    /// a sticky header, in pixels from the viewport top.
    #[serde(default = "default_reference_line")]
    pub reference_line: f64,
    /// Delay before the one deferred recomputation that runs after tracking
    /// starts, giving initial layout a moment to settle.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Number of interpolation steps the demo driver uses when emulating a
    /// smooth scroll toward a jump target.
    #[serde(default = "default_scroll_steps")]
    pub scroll_steps: u32,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            reference_line: default_reference_line(),
            settle_delay_ms: default_settle_delay_ms(),
            scroll_steps: default_scroll_steps(),
            log_level: default_log_level(),
        }
    }
}

impl TrackerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> TrackerConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return TrackerConfig::default();
        }
    };

    match toml::from_str::<TrackerConfig>(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            TrackerConfig::default()
        }
    }
}

fn default_reference_line() -> f64 {
    80.0
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_scroll_steps() -> u32 {
    6
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
