//! # Telemetry Pipeline
//!
//! The acquisition and buffered-persistence pipeline: drains the
//! sensor FIFO into the sample buffer at one rate, flushes the buffer
//! to append-only storage at another, and emits GPS location records,
//! all from a single cooperative context.
//!
//! Components:
//! - [`clock`] - session clock anchored on the first GPS fix
//! - [`ring`] - fixed-capacity sample buffer between drain and flush
//! - [`session`] - per-boot filename derivation
//! - [`LogPipeline`] - drain, flush, and GPS record emission

pub mod clock;
pub mod ring;
pub mod session;

use crate::error::Result;
use crate::hw::{imu, BlinkPattern, GpsReceiver, InertialSensor, StatusIndicator, Storage};
use crate::record::encoder::{encode_gps_record, encode_inertial_record};
use crate::record::{InertialSample, LocationRecord};
use clock::SessionClock;
use ring::SampleRingBuffer;
use session::SessionFiles;
use tokio::time::Duration;
use tracing::{debug, warn};

/// Blink repeats acknowledging a written GPS record
const GPS_RECORD_ACK_BLINKS: u8 = 2;

/// Pipeline startup parameters
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Granularity of the fix-wait poll loop
    pub fix_poll_interval: Duration,
    /// Bound on the fix wait; `None` waits forever
    pub fix_timeout: Option<Duration>,
    /// Sample buffer capacity N
    pub buffer_capacity: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fix_poll_interval: Duration::from_millis(250),
            fix_timeout: None,
            buffer_capacity: 100,
        }
    }
}

/// The telemetry pipeline, owning its collaborators
///
/// All state is accessed from one execution context; the drain step is
/// the buffer's only writer and the flush step its only reader.
pub struct LogPipeline<G, M, S, I>
where
    G: GpsReceiver,
    M: InertialSensor,
    S: Storage,
    I: StatusIndicator,
{
    gps: G,
    imu: Option<M>,
    storage: S,
    indicator: I,
    clock: SessionClock,
    session: SessionFiles,
    ring: SampleRingBuffer,
    samples_drained: u64,
    records_written: u64,
    flush_count: u64,
}

impl<G, M, S, I> LogPipeline<G, M, S, I>
where
    G: GpsReceiver,
    M: InertialSensor,
    S: Storage,
    I: StatusIndicator,
{
    /// Wait for a fix, anchor the clock, and begin the session
    ///
    /// Blocks until the GPS collaborator satisfies the fix predicates
    /// (or the configured timeout elapses). `imu` is `None` when the
    /// inertial path is disabled: the pipeline then logs GPS records
    /// only and never touches the inertial session file.
    pub async fn start(
        mut gps: G,
        imu: Option<M>,
        storage: S,
        mut indicator: I,
        options: &PipelineOptions,
    ) -> Result<Self> {
        let clock = clock::await_fix(
            &mut gps,
            &mut indicator,
            options.fix_poll_interval,
            options.fix_timeout,
        )
        .await?;
        let session = SessionFiles::begin(clock.epoch());

        Ok(Self {
            gps,
            imu,
            storage,
            indicator,
            clock,
            session,
            ring: SampleRingBuffer::new(options.buffer_capacity),
            samples_drained: 0,
            records_written: 0,
            flush_count: 0,
        })
    }

    /// Drain every complete packet currently in the sensor FIFO
    ///
    /// Each packet is decoded, stamped with the correlated time, and
    /// pushed into the buffer. When a push fills the buffer, a flush
    /// runs immediately before draining continues, so memory stays
    /// bounded at exactly N samples and no packet is dropped for lack
    /// of space. A flush failure loses that batch but never stops the
    /// drain.
    ///
    /// Returns the number of samples drained.
    pub fn drain(&mut self) -> Result<usize> {
        let Some(sensor) = self.imu.as_mut() else {
            return Ok(0);
        };

        let packet_size = sensor.packet_size();
        let mut drained = 0;

        while sensor.fifo_occupancy()? >= packet_size {
            let raw = sensor.read_packet()?;
            let sample = InertialSample {
                timestamp: self.clock.now(),
                orientation: sensor.decode_quaternion(&raw)?,
                angular_rate: imu::decode_angular_rate(&raw)?,
                linear_accel: imu::decode_linear_accel(&raw)?,
            };
            drained += 1;

            if self.ring.push(sample) {
                self.flush_count += 1;
                match flush_to_storage(
                    &mut self.ring,
                    &mut self.storage,
                    &mut self.indicator,
                    &self.session.mpu_file,
                ) {
                    Ok(written) => {
                        self.records_written += written as u64;
                        debug!("Flushed {} samples", written);
                    }
                    Err(e) => warn!("Flush failed, batch lost: {}", e),
                }
            }
        }

        self.samples_drained += drained as u64;
        Ok(drained)
    }

    /// Flush whatever the buffer holds to the inertial session file
    ///
    /// Each record is appended with its own storage call, so a fault
    /// partway through preserves every record appended before it. On
    /// failure the remainder of this flush is abandoned.
    pub fn flush(&mut self) -> Result<usize> {
        if self.ring.is_empty() {
            return Ok(0);
        }
        self.flush_count += 1;
        let written = flush_to_storage(
            &mut self.ring,
            &mut self.storage,
            &mut self.indicator,
            &self.session.mpu_file,
        )?;
        self.records_written += written as u64;
        Ok(written)
    }

    /// Read the receiver and append one location record if a fresh,
    /// valid location is available
    ///
    /// Returns `true` if a record was written. A written record is
    /// acknowledged with a short blink burst; an append failure signals
    /// the fault pattern and surfaces the error.
    pub async fn log_gps(&mut self) -> Result<bool> {
        self.gps.poll().await?;
        self.indicator.update();

        let Some(location) = self.gps.read_location() else {
            return Ok(false);
        };

        let record = LocationRecord {
            timestamp: self.clock.now(),
            latitude: location.latitude,
            longitude: location.longitude,
        };
        let line = encode_gps_record(&record);

        match self.storage.append(&self.session.gps_file, line.as_bytes()) {
            Ok(()) => {
                self.records_written += 1;
                self.indicator
                    .set_pattern(BlinkPattern::Burst(GPS_RECORD_ACK_BLINKS));
                Ok(true)
            }
            Err(e) => {
                self.indicator.set_pattern(BlinkPattern::Fault);
                Err(e)
            }
        }
    }

    /// Final flush of any samples still buffered at shutdown
    pub fn shutdown(&mut self) -> Result<usize> {
        self.flush()
    }

    /// Session epoch as a Unix timestamp
    pub fn epoch(&self) -> i64 {
        self.clock.epoch()
    }

    /// Filenames of the active session
    pub fn session(&self) -> &SessionFiles {
        &self.session
    }

    /// Samples currently buffered and not yet flushed
    pub fn buffered(&self) -> usize {
        self.ring.len()
    }

    /// Total samples drained from the FIFO this session
    pub fn samples_drained(&self) -> u64 {
        self.samples_drained
    }

    /// Total records appended to storage this session
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Number of flush invocations this session
    pub fn flush_count(&self) -> u64 {
        self.flush_count
    }
}

/// Empty the buffer into storage, one append call per record
///
/// Free function over the individual pipeline fields so the drain loop
/// can flush while it holds the sensor borrow.
fn flush_to_storage<S, I>(
    ring: &mut SampleRingBuffer,
    storage: &mut S,
    indicator: &mut I,
    path: &str,
) -> Result<usize>
where
    S: Storage,
    I: StatusIndicator,
{
    let samples = ring.drain_all();
    let total = samples.len();

    for (written, sample) in samples.iter().enumerate() {
        let line = encode_inertial_record(sample);
        if let Err(e) = storage.append(path, line.as_bytes()) {
            indicator.set_pattern(BlinkPattern::Fault);
            warn!(
                "Append failed after {} of {} records, remainder lost: {}",
                written, total, e
            );
            return Err(e);
        }
    }

    Ok(total)
}
