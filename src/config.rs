//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tokio::time::Duration;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub gps: GpsConfig,

    #[serde(default)]
    pub imu: ImuConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GPS receiver configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpsConfig {
    #[serde(default = "default_gps_device_paths")]
    pub device_paths: Vec<String>,

    #[serde(default = "default_gps_baud_rate")]
    pub baud_rate: u32,

    /// Granularity of the fix-wait poll loop
    #[serde(default = "default_fix_poll_interval_ms")]
    pub fix_poll_interval_ms: u64,

    /// Bound on the fix wait; 0 waits forever
    #[serde(default)]
    pub fix_timeout_s: u64,

    /// Period between location record reads
    #[serde(default = "default_read_period_s")]
    pub read_period_s: u64,
}

/// Inertial sensor configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ImuConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Raw FIFO capture to replay through the drain path
    #[serde(default)]
    pub replay_path: String,

    /// Period between FIFO drain checks
    #[serde(default = "default_drain_interval_ms")]
    pub drain_interval_ms: u64,
}

/// Storage medium configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_mount_dir")]
    pub mount_dir: String,
}

/// Sample buffer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BufferConfig {
    /// Buffer capacity N: a flush runs every N drained samples
    #[serde(default = "default_buffer_capacity")]
    pub capacity: usize,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Directory for rolling log files; empty logs to stderr only
    #[serde(default)]
    pub dir: String,
}

// Default value functions
fn default_gps_device_paths() -> Vec<String> {
    vec!["/dev/ttyAMA0".to_string(), "/dev/ttyUSB0".to_string()]
}
fn default_gps_baud_rate() -> u32 {
    9600
}
fn default_fix_poll_interval_ms() -> u64 {
    250
}
fn default_read_period_s() -> u64 {
    5
}

fn default_drain_interval_ms() -> u64 {
    50
}

fn default_mount_dir() -> String {
    "/mnt/sd".to_string()
}

fn default_buffer_capacity() -> usize {
    100
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            device_paths: default_gps_device_paths(),
            baud_rate: default_gps_baud_rate(),
            fix_poll_interval_ms: default_fix_poll_interval_ms(),
            fix_timeout_s: 0,
            read_period_s: default_read_period_s(),
        }
    }
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            replay_path: String::new(),
            drain_interval_ms: default_drain_interval_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            mount_dir: default_mount_dir(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: default_buffer_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { dir: String::new() }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails,
    /// or validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.gps.device_paths.is_empty() {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "gps device_paths cannot be empty",
            )));
        }
        if self.gps.baud_rate == 0 {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "gps baud_rate must be positive",
            )));
        }
        if self.gps.fix_poll_interval_ms == 0 {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "gps fix_poll_interval_ms must be positive",
            )));
        }
        if self.gps.read_period_s == 0 {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "gps read_period_s must be positive",
            )));
        }
        if self.imu.drain_interval_ms == 0 {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "imu drain_interval_ms must be positive",
            )));
        }
        if self.buffer.capacity == 0 {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "buffer capacity must be positive",
            )));
        }
        if self.imu.enabled && self.imu.replay_path.is_empty() {
            return Err(crate::error::LoggerError::Config(toml::de::Error::custom(
                "imu replay_path required when imu is enabled",
            )));
        }
        Ok(())
    }

    /// Fix-wait poll interval as a duration
    pub fn fix_poll_interval(&self) -> Duration {
        Duration::from_millis(self.gps.fix_poll_interval_ms)
    }

    /// Fix-wait bound; `None` waits forever
    pub fn fix_timeout(&self) -> Option<Duration> {
        match self.gps.fix_timeout_s {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
