//! # Hardware Module
//!
//! Collaborator interfaces for the peripherals the pipeline depends on.
//!
//! This module handles:
//! - GPS receiver seam and the serial NMEA implementation
//! - Inertial sensor seam, FIFO packet layout, and replay source
//! - Storage medium seam and the SD-card filesystem implementation
//! - Status indicator seam
//!
//! Every peripheral is behind a trait so the pipeline takes injected
//! implementations and tests can substitute doubles.

pub mod gps;
pub mod imu;
pub mod indicator;
pub mod storage;
pub mod uart;

pub use gps::{GpsDateTime, GpsLocation, GpsReceiver};
pub use imu::{DataReadyFlag, InertialSensor};
pub use indicator::{BlinkPattern, StatusIndicator};
pub use storage::Storage;
