//! # GPS Receiver
//!
//! Collaborator interface for the GPS source plus the serial NMEA
//! implementation. The sentence decode itself is delegated to the
//! `nmea` crate; this module only evaluates fix quality at the
//! interface and tracks which fields have been refreshed since they
//! were last consumed.

use crate::error::Result;
use crate::hw::uart::{UartLink, UartRead};
use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use nmea::{Nmea, SentenceType};
use tracing::debug;

/// Longest sentence the assembler will buffer before discarding.
/// NMEA 0183 caps sentences at 82 characters; anything longer is line noise.
const MAX_SENTENCE_LEN: usize = 96;

/// Time-of-day and date as read from the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsDateTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

/// Position as read from the receiver, decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Trait for the GPS collaborator
///
/// A fix is "satisfied" only when location, time, and date are all valid
/// and all freshly updated; `is_fixed` evaluates those six predicates.
#[async_trait]
pub trait GpsReceiver: Send {
    /// Ingest pending receiver output
    async fn poll(&mut self) -> Result<()>;

    /// True iff location, time, and date are valid and freshly updated
    fn is_fixed(&self) -> bool;

    /// Take the time and date, if valid and updated since the last take
    fn read_time(&mut self) -> Option<GpsDateTime>;

    /// Take the current location, if valid and updated since the last take
    fn read_location(&mut self) -> Option<GpsLocation>;
}

/// Serial NMEA GPS receiver
///
/// Assembles sentences from UART chunks, feeds them to the NMEA parser,
/// and tracks per-field freshness the way TinyGPS-style libraries do:
/// an "updated" flag is set when a sentence refreshes the field and
/// cleared when the field is consumed.
pub struct SerialGps<P: UartRead> {
    uart: P,
    parser: Nmea,
    sentence: String,
    location_updated: bool,
    time_updated: bool,
    date_updated: bool,
}

impl SerialGps<UartLink> {
    /// Open the receiver on the first available device path
    pub fn open(paths: &[&str], baud_rate: u32) -> Result<Self> {
        let uart = UartLink::open_with_paths(paths, baud_rate)?;
        debug!("GPS receiver bound to {}", uart.device_path());
        Ok(Self::new(uart))
    }
}

impl<P: UartRead> SerialGps<P> {
    /// Wrap an already-open transport
    pub fn new(uart: P) -> Self {
        Self {
            uart,
            parser: Nmea::default(),
            sentence: String::with_capacity(MAX_SENTENCE_LEN),
            location_updated: false,
            time_updated: false,
            date_updated: false,
        }
    }

    /// Feed raw receiver bytes into the sentence assembler
    fn ingest(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match byte {
                b'\n' => self.finish_sentence(),
                b'\r' => {}
                _ => {
                    if self.sentence.len() >= MAX_SENTENCE_LEN {
                        // Runaway line, resynchronize at the next terminator
                        self.sentence.clear();
                    }
                    self.sentence.push(byte as char);
                }
            }
        }
    }

    /// Parse one completed sentence and record which fields it refreshed
    fn finish_sentence(&mut self) {
        if self.sentence.is_empty() {
            return;
        }

        match self.parser.parse(&self.sentence) {
            Ok(SentenceType::RMC) => {
                self.time_updated |= self.parser.fix_time.is_some();
                self.date_updated |= self.parser.fix_date.is_some();
                self.location_updated |=
                    self.parser.latitude.is_some() && self.parser.longitude.is_some();
            }
            Ok(SentenceType::GGA) => {
                self.time_updated |= self.parser.fix_time.is_some();
                self.location_updated |=
                    self.parser.latitude.is_some() && self.parser.longitude.is_some();
            }
            Ok(_) => {}
            Err(e) => {
                debug!("Discarding NMEA sentence: {}", e);
            }
        }

        self.sentence.clear();
    }
}

#[async_trait]
impl<P: UartRead> GpsReceiver for SerialGps<P> {
    async fn poll(&mut self) -> Result<()> {
        let mut buf = [0u8; 256];
        loop {
            let n = self.uart.read_chunk(&mut buf).await?;
            if n == 0 {
                return Ok(());
            }
            self.ingest(&buf[..n]);
        }
    }

    fn is_fixed(&self) -> bool {
        self.location_updated
            && self.time_updated
            && self.date_updated
            && self.parser.latitude.is_some()
            && self.parser.longitude.is_some()
            && self.parser.fix_time.is_some()
            && self.parser.fix_date.is_some()
    }

    fn read_time(&mut self) -> Option<GpsDateTime> {
        if !self.time_updated || !self.date_updated {
            return None;
        }
        let time = self.parser.fix_time?;
        let date = self.parser.fix_date?;
        self.time_updated = false;
        self.date_updated = false;
        Some(GpsDateTime {
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
            day: date.day(),
            month: date.month(),
            year: date.year(),
        })
    }

    fn read_location(&mut self) -> Option<GpsLocation> {
        if !self.location_updated {
            return None;
        }
        let latitude = self.parser.latitude?;
        let longitude = self.parser.longitude?;
        self.location_updated = false;
        Some(GpsLocation {
            latitude,
            longitude,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::mocks::MockUart;
    use super::*;

    // Well-known valid sample sentences (checksums verified)
    const RMC: &str = "$GPRMC,092750.000,A,5321.6802,N,00630.3372,W,0.02,31.66,280511,,,A*43\r\n";
    const GGA: &str = "$GPGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76\r\n";

    fn gps_with(chunks: Vec<Vec<u8>>) -> SerialGps<MockUart> {
        SerialGps::new(MockUart::new(chunks))
    }

    #[tokio::test]
    async fn test_rmc_sentence_satisfies_fix_predicates() {
        let mut gps = gps_with(vec![RMC.as_bytes().to_vec()]);
        gps.poll().await.unwrap();

        assert!(gps.is_fixed(), "RMC carries location, time, and date");

        let time = gps.read_time().unwrap();
        assert_eq!(time.hour, 9);
        assert_eq!(time.minute, 27);
        assert_eq!(time.second, 50);
        assert_eq!(time.day, 28);
        assert_eq!(time.month, 5);
        assert_eq!(time.year, 2011);
    }

    #[tokio::test]
    async fn test_gga_alone_is_not_a_fix() {
        // GGA has no date field, so the date predicate stays unsatisfied
        let mut gps = gps_with(vec![GGA.as_bytes().to_vec()]);
        gps.poll().await.unwrap();

        assert!(!gps.is_fixed());
        assert!(gps.read_location().is_some(), "location itself is valid");
    }

    #[tokio::test]
    async fn test_location_read_clears_updated_flag() {
        let mut gps = gps_with(vec![RMC.as_bytes().to_vec()]);
        gps.poll().await.unwrap();

        let location = gps.read_location().unwrap();
        assert!((location.latitude - 53.361337).abs() < 1e-4);
        assert!((location.longitude - (-6.505620)).abs() < 1e-4);

        // Second read with no fresh sentence returns nothing
        assert!(gps.read_location().is_none());
    }

    #[tokio::test]
    async fn test_sentence_split_across_chunks() {
        let bytes = RMC.as_bytes();
        let (head, tail) = bytes.split_at(20);
        let mut gps = gps_with(vec![head.to_vec(), tail.to_vec()]);

        gps.poll().await.unwrap();
        assert!(gps.is_fixed());
    }

    #[tokio::test]
    async fn test_corrupt_checksum_is_discarded() {
        let corrupt = RMC.replace("*43", "*00");
        let mut gps = gps_with(vec![corrupt.as_bytes().to_vec()]);
        gps.poll().await.unwrap();

        assert!(!gps.is_fixed());
        assert!(gps.read_location().is_none());
    }

    #[tokio::test]
    async fn test_time_read_clears_updated_flags() {
        let mut gps = gps_with(vec![RMC.as_bytes().to_vec()]);
        gps.poll().await.unwrap();

        assert!(gps.is_fixed());
        let time = gps.read_time().unwrap();
        assert_eq!(time.day, 28);

        // Consumed: no fresh sentence means no second take, and the
        // fix predicates drop back to unsatisfied
        assert!(gps.read_time().is_none());
        assert!(!gps.is_fixed());
    }

    #[tokio::test]
    async fn test_chunk_larger_than_read_buffer_loses_no_bytes() {
        // One queued chunk well past the 256-byte poll buffer; the
        // sentence at its tail must still arrive intact
        let mut chunk = vec![b'x'; 300];
        chunk.push(b'\n');
        chunk.extend_from_slice(RMC.as_bytes());
        let mut gps = gps_with(vec![chunk]);

        gps.poll().await.unwrap();
        assert!(gps.is_fixed());
    }

    #[tokio::test]
    async fn test_line_noise_does_not_poison_assembler() {
        let mut noise = vec![b'x'; 300];
        noise.push(b'\n');
        let mut gps = gps_with(vec![noise, RMC.as_bytes().to_vec()]);

        gps.poll().await.unwrap();
        assert!(gps.is_fixed(), "valid sentence after noise still parses");
    }
}
