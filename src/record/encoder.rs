//! # Record Encoder
//!
//! Formats inertial samples and location records as the delimited text
//! lines written to the session files.
//!
//! **Inertial record**:
//! `<ts>;<qw>;<qx>;<qy>;<qz>;<gX>;<gY>;<gZ>;<aX>;<aY>;<aZ>\n`
//!
//! **GPS record**: `<ts>;<lat>;<lng>\n`
//!
//! Floating-point fields use fixed-point notation with 6 fractional
//! digits; integer fields are plain decimal.

use super::types::{InertialSample, LocationRecord};

/// Encode one inertial sample as a text record line
///
/// # Arguments
///
/// * `sample` - Sample to encode
///
/// # Returns
///
/// * `String` - One record line, terminated with `\n`
///
/// # Examples
///
/// ```
/// use field_logger::record::encoder::encode_inertial_record;
/// use field_logger::record::types::{InertialSample, Quaternion};
///
/// let sample = InertialSample {
///     timestamp: 1700000000,
///     orientation: Quaternion::IDENTITY,
///     angular_rate: [10, -20, 30],
///     linear_accel: [-40, 50, -60],
/// };
/// let line = encode_inertial_record(&sample);
/// assert_eq!(line, "1700000000;1.000000;0.000000;0.000000;0.000000;10;-20;30;-40;50;-60\n");
/// ```
pub fn encode_inertial_record(sample: &InertialSample) -> String {
    format!(
        "{};{:.6};{:.6};{:.6};{:.6};{};{};{};{};{};{}\n",
        sample.timestamp,
        sample.orientation.w,
        sample.orientation.x,
        sample.orientation.y,
        sample.orientation.z,
        sample.angular_rate[0],
        sample.angular_rate[1],
        sample.angular_rate[2],
        sample.linear_accel[0],
        sample.linear_accel[1],
        sample.linear_accel[2],
    )
}

/// Encode one GPS location record as a text record line
///
/// Latitude and longitude are written as 6-decimal fixed point.
pub fn encode_gps_record(record: &LocationRecord) -> String {
    format!(
        "{};{:.6};{:.6}\n",
        record.timestamp, record.latitude, record.longitude,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::types::Quaternion;

    #[test]
    fn test_inertial_record_format() {
        let sample = InertialSample {
            timestamp: 1_600_000_123,
            orientation: Quaternion {
                w: 0.5,
                x: -0.5,
                y: 0.25,
                z: -0.25,
            },
            angular_rate: [100, -200, 300],
            linear_accel: [-1000, 2000, -3000],
        };

        let line = encode_inertial_record(&sample);
        assert_eq!(
            line,
            "1600000123;0.500000;-0.500000;0.250000;-0.250000;100;-200;300;-1000;2000;-3000\n"
        );
    }

    #[test]
    fn test_inertial_record_ends_with_newline() {
        let sample = InertialSample {
            timestamp: 0,
            orientation: Quaternion::IDENTITY,
            angular_rate: [0, 0, 0],
            linear_accel: [0, 0, 0],
        };
        assert!(encode_inertial_record(&sample).ends_with('\n'));
    }

    #[test]
    fn test_gps_record_format() {
        // Scenario from the field trial: fix in São Paulo
        let record = LocationRecord {
            timestamp: 1_590_000_000,
            latitude: -23.561,
            longitude: -46.6553,
        };

        let line = encode_gps_record(&record);
        assert_eq!(line, "1590000000;-23.561000;-46.655300\n");
    }

    #[test]
    fn test_gps_record_pads_to_six_decimals() {
        let record = LocationRecord {
            timestamp: 1,
            latitude: 0.1,
            longitude: -0.1,
        };
        assert_eq!(encode_gps_record(&record), "1;0.100000;-0.100000\n");
    }

    #[test]
    fn test_int16_extremes_encode_as_plain_decimal() {
        let sample = InertialSample {
            timestamp: 42,
            orientation: Quaternion::IDENTITY,
            angular_rate: [i16::MIN, i16::MAX, 0],
            linear_accel: [0, i16::MIN, i16::MAX],
        };
        let line = encode_inertial_record(&sample);
        assert!(line.contains(";-32768;32767;0;"));
        assert!(line.contains(";0;-32768;32767\n"));
    }
}
