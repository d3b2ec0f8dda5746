//! # Record Decoder
//!
//! Parses the delimited text record lines back into their data types.
//! The pipeline itself only writes records; parsing exists so written
//! data can be verified (and so post-processing tools share one
//! definition of the format).

use super::types::{InertialSample, LocationRecord, Quaternion};
use crate::error::{LoggerError, Result};

/// Number of `;`-separated fields in an inertial record
const INERTIAL_FIELD_COUNT: usize = 11;

/// Number of `;`-separated fields in a GPS record
const GPS_FIELD_COUNT: usize = 3;

/// Parse one inertial record line
///
/// # Arguments
///
/// * `line` - One record line, with or without the trailing `\n`
///
/// # Errors
///
/// Returns error if the field count is wrong or any field fails to parse
pub fn parse_inertial_record(line: &str) -> Result<InertialSample> {
    let fields: Vec<&str> = line.trim_end_matches('\n').split(';').collect();
    if fields.len() != INERTIAL_FIELD_COUNT {
        return Err(LoggerError::Record(format!(
            "expected {} fields, got {}",
            INERTIAL_FIELD_COUNT,
            fields.len()
        )));
    }

    Ok(InertialSample {
        timestamp: parse_field::<i64>(fields[0], "timestamp")?,
        orientation: Quaternion {
            w: parse_field::<f32>(fields[1], "qw")?,
            x: parse_field::<f32>(fields[2], "qx")?,
            y: parse_field::<f32>(fields[3], "qy")?,
            z: parse_field::<f32>(fields[4], "qz")?,
        },
        angular_rate: [
            parse_field::<i16>(fields[5], "gX")?,
            parse_field::<i16>(fields[6], "gY")?,
            parse_field::<i16>(fields[7], "gZ")?,
        ],
        linear_accel: [
            parse_field::<i16>(fields[8], "aX")?,
            parse_field::<i16>(fields[9], "aY")?,
            parse_field::<i16>(fields[10], "aZ")?,
        ],
    })
}

/// Parse one GPS record line
///
/// # Errors
///
/// Returns error if the field count is wrong or any field fails to parse
pub fn parse_gps_record(line: &str) -> Result<LocationRecord> {
    let fields: Vec<&str> = line.trim_end_matches('\n').split(';').collect();
    if fields.len() != GPS_FIELD_COUNT {
        return Err(LoggerError::Record(format!(
            "expected {} fields, got {}",
            GPS_FIELD_COUNT,
            fields.len()
        )));
    }

    Ok(LocationRecord {
        timestamp: parse_field::<i64>(fields[0], "timestamp")?,
        latitude: parse_field::<f64>(fields[1], "latitude")?,
        longitude: parse_field::<f64>(fields[2], "longitude")?,
    })
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str) -> Result<T> {
    field
        .parse::<T>()
        .map_err(|_| LoggerError::Record(format!("invalid {name} field: {field:?}")))
}
