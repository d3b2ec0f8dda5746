//! # UART Transport
//!
//! Serial transport for the GPS receiver.
//!
//! This module handles:
//! - Opening the serial port at the receiver's baud rate (9600 for the
//!   u-blox NEO class modules this logger ships with)
//! - Ordered device-path fallback when auto-detecting the receiver
//! - Short-grace-window chunk reads so the main loop never blocks on a
//!   quiet receiver

use crate::error::{LoggerError, Result};
use async_trait::async_trait;
use tokio::time::Duration;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Default GPS receiver baud rate
pub const GPS_BAUD_RATE: u32 = 9600;

/// How long a chunk read waits for bytes before reporting an idle line.
/// A 1 ms window keeps poll latency negligible against the sample rate.
const READ_GRACE: Duration = Duration::from_millis(1);

/// Trait for UART read operations, abstracted to enable testing
#[async_trait]
pub trait UartRead: Send {
    /// Read whatever bytes are pending, up to `buf.len()`
    ///
    /// Returns `Ok(0)` when nothing arrived within the grace window.
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;
}

/// Opened UART device
///
/// Manages the serial connection to a receiver, opened with 8N1 framing.
pub struct UartLink {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyAMA0)
    device_path: String,
}

impl std::fmt::Debug for UartLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UartLink")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl UartLink {
    /// Open a UART device, trying candidate paths in order
    ///
    /// # Arguments
    ///
    /// * `paths` - Device paths to try (e.g., &["/dev/ttyAMA0"])
    /// * `baud_rate` - Line speed
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` if no candidate path opens
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Successfully opened serial device at {}", path);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                    continue;
                }
            }
        }

        Err(LoggerError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open a specific serial port with 8N1 framing
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        let port = tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| LoggerError::Serial(format!("Failed to open {}: {}", path, e)))?;

        Ok(port)
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl UartRead for UartLink {
    async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        use tokio::io::AsyncReadExt;

        match tokio::time::timeout(READ_GRACE, self.port.read(buf)).await {
            Ok(Ok(n)) => Ok(n),
            Ok(Err(e)) => Err(LoggerError::Serial(format!(
                "Failed to read from {}: {}",
                self.device_path, e
            ))),
            // Line idle within the grace window
            Err(_) => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_baud_rate_constant() {
        // NMEA receivers default to 9600 baud
        assert_eq!(GPS_BAUD_RATE, 9600);
    }

    #[test]
    fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];
        let result = UartLink::open_with_paths(invalid_paths, GPS_BAUD_RATE);

        assert!(result.is_err());
        match result.unwrap_err() {
            LoggerError::SerialPortNotFound(msg) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            other => panic!("Expected SerialPortNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_with_empty_paths_returns_error() {
        let empty_paths: &[&str] = &[];
        let result = UartLink::open_with_paths(empty_paths, GPS_BAUD_RATE);

        assert!(result.is_err());
        match result.unwrap_err() {
            LoggerError::SerialPortNotFound(_) => {}
            other => panic!("Expected SerialPortNotFound, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_port_with_invalid_path_returns_error() {
        let result = UartLink::open_port("/dev/nonexistent_serial_device_12345", GPS_BAUD_RATE);

        assert!(result.is_err());
        match result.unwrap_err() {
            LoggerError::Serial(msg) => {
                assert!(msg.contains("/dev/nonexistent_serial_device_12345"));
                assert!(msg.contains("Failed to open"));
            }
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }
}
