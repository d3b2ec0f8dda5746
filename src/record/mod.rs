//! # Record Module
//!
//! Text record format shared by the flush path and the GPS logging path.
//!
//! This module handles:
//! - Data types for drained samples and location records
//! - Encoding records as delimited text lines
//! - Parsing record lines back (verification and tooling)

pub mod decoder;
pub mod encoder;
pub mod types;

pub use types::{InertialSample, LocationRecord, Quaternion};
