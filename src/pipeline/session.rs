//! # Session Manager
//!
//! Derives the per-boot session filenames from the clock epoch. The
//! names are fixed for the device's uptime: a power cycle produces a
//! new epoch and therefore new files, and prior files are never
//! appended to again.

/// The pair of append-only files a session writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFiles {
    /// GPS location records, one line per successful fix read
    pub gps_file: String,
    /// Inertial sample records, one line per drained sample
    pub mpu_file: String,
}

impl SessionFiles {
    /// Derive both filenames from the session epoch, once
    pub fn begin(epoch: i64) -> Self {
        Self {
            gps_file: format!("{epoch}-gps.txt"),
            mpu_file: format!("{epoch}-mpu.txt"),
        }
    }
}
