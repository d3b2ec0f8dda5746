//! # Field Logger Library
//!
//! Battery-powered field data logger: acquires a GPS fix, timestamps
//! locally-sampled inertial data against it, buffers the samples in
//! memory, and persists them as delimited text records to removable
//! storage, with status conveyed via a blinking indicator.
//!
//! The core is the telemetry acquisition and buffered-persistence
//! pipeline in [`pipeline`]; peripherals are trait collaborators in
//! [`hw`] so tests and host-side runs can substitute doubles.

pub mod config;
pub mod error;
pub mod hw;
pub mod pipeline;
pub mod record;
