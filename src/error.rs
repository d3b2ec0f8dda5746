//! # Error Types
//!
//! Custom error types for the field logger using `thiserror`.

use thiserror::Error;

/// Main error type for the field logger
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No serial device found at any of the candidate paths
    #[error("No serial device found at: {0}")]
    SerialPortNotFound(String),

    /// Serial transport errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// GPS receiver errors
    #[error("GPS error: {0}")]
    Gps(String),

    /// Inertial sensor errors
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Storage medium errors (mount or append failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed text record
    #[error("Record format error: {0}")]
    Record(String),

    /// GPS fix was not acquired within the configured timeout
    #[error("GPS fix not acquired within {0} seconds")]
    FixTimeout(u64),
}

/// Result type alias for the field logger
pub type Result<T> = std::result::Result<T, LoggerError>;
