//! # Inertial Sensor
//!
//! Collaborator interface for the motion processor plus the fixed FIFO
//! packet layout it emits. The on-chip motion pipeline produces 42-byte
//! packets with the orientation quaternion and the raw angular-rate and
//! linear-acceleration words at known byte offsets; this module owns
//! those offsets and the field extraction.

use crate::error::{LoggerError, Result};
use crate::record::Quaternion;
use bytes::Bytes;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Size of one motion-processor FIFO packet in bytes
pub const DMP_PACKET_SIZE: usize = 42;

// Big-endian i16 field offsets within a packet. Quaternion components
// are q14 fixed point at 0/4/8/12; gyro at 16/20/24; accel at 28/32/36.
const QUAT_OFFSETS: [usize; 4] = [0, 4, 8, 12];
const GYRO_OFFSETS: [usize; 3] = [16, 20, 24];
const ACCEL_OFFSETS: [usize; 3] = [28, 32, 36];

/// Scale factor from q14 fixed point to unit quaternion components
const QUAT_SCALE: f32 = 1.0 / 16384.0;

/// Trait for the inertial sensor collaborator
pub trait InertialSensor: Send {
    /// Bytes currently held in the hardware FIFO
    fn fifo_occupancy(&mut self) -> Result<usize>;

    /// Size of one FIFO packet for the active firmware configuration
    fn packet_size(&self) -> usize {
        DMP_PACKET_SIZE
    }

    /// Pop one packet from the FIFO
    fn read_packet(&mut self) -> Result<Bytes>;

    /// Decode the orientation quaternion from a raw packet
    fn decode_quaternion(&self, packet: &[u8]) -> Result<Quaternion> {
        let [w, x, y, z] = QUAT_OFFSETS;
        Ok(Quaternion {
            w: be_i16_at(packet, w)? as f32 * QUAT_SCALE,
            x: be_i16_at(packet, x)? as f32 * QUAT_SCALE,
            y: be_i16_at(packet, y)? as f32 * QUAT_SCALE,
            z: be_i16_at(packet, z)? as f32 * QUAT_SCALE,
        })
    }
}

/// Extract the raw angular-rate words from a packet
pub fn decode_angular_rate(packet: &[u8]) -> Result<[i16; 3]> {
    let [x, y, z] = GYRO_OFFSETS;
    Ok([
        be_i16_at(packet, x)?,
        be_i16_at(packet, y)?,
        be_i16_at(packet, z)?,
    ])
}

/// Extract the raw linear-acceleration words from a packet
pub fn decode_linear_accel(packet: &[u8]) -> Result<[i16; 3]> {
    let [x, y, z] = ACCEL_OFFSETS;
    Ok([
        be_i16_at(packet, x)?,
        be_i16_at(packet, y)?,
        be_i16_at(packet, z)?,
    ])
}

fn be_i16_at(packet: &[u8], offset: usize) -> Result<i16> {
    let hi = packet.get(offset);
    let lo = packet.get(offset + 1);
    match (hi, lo) {
        (Some(&hi), Some(&lo)) => Ok(i16::from_be_bytes([hi, lo])),
        _ => Err(LoggerError::Sensor(format!(
            "packet too short: {} bytes, field at offset {}",
            packet.len(),
            offset
        ))),
    }
}

/// Single-producer/single-consumer data-ready flag
///
/// Models the hardware data-ready interrupt: the interrupt context only
/// raises the flag, the loop context clears-and-acts via `take`. Never
/// the reverse.
#[derive(Debug, Clone, Default)]
pub struct DataReadyFlag {
    inner: Arc<AtomicBool>,
}

impl DataReadyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that sensor data is available (producer side)
    pub fn raise(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was raised (consumer side)
    pub fn take(&self) -> bool {
        self.inner.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

/// Inertial source replaying recorded FIFO packets from a file
///
/// The real motion-processor driver lives behind `InertialSensor`; this
/// source feeds previously captured FIFO dumps through the identical
/// drain path for host-side runs and field-data reprocessing. A trailing
/// partial packet in the capture is ignored.
pub struct FifoReplay {
    packets: std::collections::VecDeque<Bytes>,
    data_ready: DataReadyFlag,
}

impl FifoReplay {
    /// Load a raw FIFO capture
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read(path)?;
        let whole = raw.len() / DMP_PACKET_SIZE * DMP_PACKET_SIZE;
        let raw = Bytes::from(raw);

        let packets: std::collections::VecDeque<Bytes> = (0..whole)
            .step_by(DMP_PACKET_SIZE)
            .map(|i| raw.slice(i..i + DMP_PACKET_SIZE))
            .collect();

        let data_ready = DataReadyFlag::new();
        if !packets.is_empty() {
            data_ready.raise();
        }

        Ok(Self {
            packets,
            data_ready,
        })
    }

    /// Handle to the data-ready flag for the main loop
    pub fn data_ready(&self) -> DataReadyFlag {
        self.data_ready.clone()
    }
}

impl InertialSensor for FifoReplay {
    fn fifo_occupancy(&mut self) -> Result<usize> {
        Ok(self.packets.len() * DMP_PACKET_SIZE)
    }

    fn read_packet(&mut self) -> Result<Bytes> {
        let packet = self
            .packets
            .pop_front()
            .ok_or_else(|| LoggerError::Sensor("FIFO underrun".to_string()))?;
        if !self.packets.is_empty() {
            self.data_ready.raise();
        }
        Ok(packet)
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Build a raw FIFO packet from decoded field values
    pub fn dmp_packet(q: &Quaternion, gyro: [i16; 3], accel: [i16; 3]) -> Bytes {
        let mut raw = vec![0u8; DMP_PACKET_SIZE];
        let components = [q.w, q.x, q.y, q.z];
        for (&offset, &value) in QUAT_OFFSETS.iter().zip(components.iter()) {
            put_be_i16(&mut raw, offset, (value / QUAT_SCALE) as i16);
        }
        for (&offset, &value) in GYRO_OFFSETS.iter().zip(gyro.iter()) {
            put_be_i16(&mut raw, offset, value);
        }
        for (&offset, &value) in ACCEL_OFFSETS.iter().zip(accel.iter()) {
            put_be_i16(&mut raw, offset, value);
        }
        Bytes::from(raw)
    }

    fn put_be_i16(raw: &mut [u8], offset: usize, value: i16) {
        let bytes = value.to_be_bytes();
        raw[offset] = bytes[0];
        raw[offset + 1] = bytes[1];
    }

    /// Mock sensor serving queued packets
    #[derive(Clone, Default)]
    pub struct MockImu {
        packets: Arc<Mutex<VecDeque<Bytes>>>,
    }

    impl MockImu {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_packet(&self, packet: Bytes) {
            self.packets.lock().unwrap().push_back(packet);
        }

        pub fn push_samples(&self, count: usize) {
            for i in 0..count {
                self.push_packet(dmp_packet(
                    &Quaternion::IDENTITY,
                    [i as i16, 0, 0],
                    [0, 0, i as i16],
                ));
            }
        }
    }

    impl InertialSensor for MockImu {
        fn fifo_occupancy(&mut self) -> Result<usize> {
            Ok(self.packets.lock().unwrap().len() * DMP_PACKET_SIZE)
        }

        fn read_packet(&mut self) -> Result<Bytes> {
            self.packets
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LoggerError::Sensor("FIFO underrun".to_string()))
        }
    }
}
