//! # Record Types
//!
//! Plain data types for the two record streams the logger persists:
//! inertial samples drained from the motion processor and location
//! records derived from GPS fixes.

/// Orientation quaternion as produced by the motion processor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Identity orientation (no rotation)
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
}

/// One drained inertial sample
///
/// Created by the drain step from a raw FIFO packet, stamped with the
/// session clock at the moment of draining, and immutable afterwards.
/// Angular rate and linear acceleration are kept in raw sensor units
/// (16-bit signed), exactly as they appear in the FIFO packet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertialSample {
    /// Seconds reported by the session clock at drain time (Unix timestamp)
    pub timestamp: i64,
    /// Orientation quaternion decoded from the packet
    pub orientation: Quaternion,
    /// Raw angular rate, X/Y/Z
    pub angular_rate: [i16; 3],
    /// Raw linear acceleration, X/Y/Z
    pub linear_accel: [i16; 3],
}

/// One GPS location record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationRecord {
    /// Seconds reported by the session clock at read time (Unix timestamp)
    pub timestamp: i64,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}
