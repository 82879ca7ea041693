//! Configuration management for kbdrec
//!
//! Settings are read from a platform-specific TOML file. A missing file
//! means defaults; every section and field may be omitted.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/kbdrec/config.toml` |
//! | macOS | `~/Library/Application Support/kbdrec/config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use kbdrec::Config;
//!
//! let config = Config::load().unwrap_or_default();
//! println!("Recording to {}", config.storage.path.display());
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Returns the path to the config file.
///
/// The file and its directory are not created.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("kbdrec").join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Record file settings
    pub storage: StorageConfig,
    /// Key event source settings
    pub capture: CaptureConfig,
    /// Typing speed estimation settings
    pub speed: SpeedConfig,
    /// Console output settings
    pub display: DisplayConfig,
}

/// Record file configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the tab-separated record file
    pub path: PathBuf,
    /// Persist every this many key events (0 disables autosave)
    pub autosave_every: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("kbdrec.tsv"),
            autosave_every: 2000,
        }
    }
}

/// Capture backend selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CaptureBackend {
    /// Spawn `evtest` and parse its output
    Evtest,
    /// Read the device node directly
    Evdev,
}

/// Key event source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureConfig {
    pub backend: CaptureBackend,
    /// Run `evtest` through `sudo`
    pub use_sudo: bool,
    /// Device node prefix; the event ID is appended
    pub device_prefix: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            backend: CaptureBackend::Evtest,
            use_sudo: true,
            device_prefix: "/dev/input/event".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Device node path for an event ID
    pub fn device_path(&self, event_id: u32) -> PathBuf {
        PathBuf::from(format!("{}{}", self.device_prefix, event_id))
    }
}

/// Typing speed configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeedConfig {
    /// Number of recent intervals averaged
    pub window: usize,
    /// Intervals at or above this are pauses, not typing
    pub slow_cutoff_ms: u64,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            window: 100,
            slow_cutoff_ms: 3000,
        }
    }
}

impl SpeedConfig {
    pub fn slow_cutoff(&self) -> Duration {
        Duration::from_millis(self.slow_cutoff_ms)
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Fixed number of events between status lines; derived from the
    /// terminal width when unset
    pub status_interval: Option<u64>,
    /// Columns reserved for the status line itself
    pub status_margin: u16,
    /// Interval used when the terminal width is unknown or too narrow
    pub fallback_interval: u64,
    pub report_format: ReportFormat,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            status_interval: None,
            status_margin: 34,
            fallback_interval: 46,
            report_format: ReportFormat::Text,
        }
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_config_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("kbdrec-config-{}-{}.toml", name, std::process::id()))
    }

    #[test]
    fn config_default_values() {
        let config = Config::default();
        assert_eq!(config.storage.path, PathBuf::from("kbdrec.tsv"));
        assert_eq!(config.storage.autosave_every, 2000);
        assert_eq!(config.capture.backend, CaptureBackend::Evtest);
        assert!(config.capture.use_sudo);
        assert_eq!(config.speed.window, 100);
        assert_eq!(config.speed.slow_cutoff(), Duration::from_secs(3));
        assert_eq!(config.display.status_interval, None);
        assert_eq!(config.display.status_margin, 34);
        assert_eq!(config.display.report_format, ReportFormat::Text);
    }

    #[test]
    fn device_path_appends_event_id() {
        let config = CaptureConfig::default();
        assert_eq!(config.device_path(3), PathBuf::from("/dev/input/event3"));
    }

    #[test]
    fn config_load_from_file() {
        let path = temp_config_path("load");
        fs::write(
            &path,
            "[storage]\npath = \"/tmp/keys.tsv\"\n\n[display]\nstatus_interval = 10\n",
        )
        .expect("Failed to write config");

        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded.storage.path, PathBuf::from("/tmp/keys.tsv"));
        // Omitted fields keep their defaults
        assert_eq!(loaded.storage.autosave_every, 2000);
        assert_eq!(loaded.display.status_interval, Some(10));
        assert_eq!(loaded.display.status_margin, 34);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_load_missing_file_is_error() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let result = Config::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml_str = r#"
[storage]
path = "keys.tsv"
autosave_every = 0

[capture]
backend = "evdev"
use_sudo = false
device_prefix = "/dev/input/by-id/event"

[speed]
window = 50
slow_cutoff_ms = 1500

[display]
status_margin = 40
fallback_interval = 20
report_format = "json"
"#;

        let config: Config = toml::from_str(toml_str).expect("Failed to deserialize");

        assert_eq!(config.storage.path, PathBuf::from("keys.tsv"));
        assert_eq!(config.storage.autosave_every, 0);
        assert_eq!(config.capture.backend, CaptureBackend::Evdev);
        assert!(!config.capture.use_sudo);
        assert_eq!(config.capture.device_path(1), PathBuf::from("/dev/input/by-id/event1"));
        assert_eq!(config.speed.window, 50);
        assert_eq!(config.speed.slow_cutoff(), Duration::from_millis(1500));
        assert_eq!(config.display.status_margin, 40);
        assert_eq!(config.display.fallback_interval, 20);
        assert_eq!(config.display.report_format, ReportFormat::Json);
    }

    #[test]
    fn config_rejects_unknown_backend() {
        let result: Result<Config, _> = toml::from_str("[capture]\nbackend = \"x11\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");

        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[capture]"));
        assert!(toml_str.contains("backend = \"evtest\""));
        assert!(toml_str.contains("autosave_every = 2000"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NoConfigDir;
        assert_eq!(err.to_string(), "Could not determine config directory");

        let io_err = ConfigError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(io_err.to_string().contains("IO error"));
    }
}
