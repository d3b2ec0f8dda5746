//! # Sample Ring Buffer
//!
//! Fixed-capacity buffer holding drained inertial samples between
//! flushes. The drain step is the sole writer, the flush step the sole
//! reader, both on the same execution context, so no locking is needed.
//! The buffer never grows past its capacity: memory stays bounded at
//! exactly N samples.

use crate::record::InertialSample;

/// Fixed-capacity sample buffer
///
/// Samples are kept in push order. `drain_all` empties the buffer
/// wholesale; there is no partial reset.
#[derive(Debug)]
pub struct SampleRingBuffer {
    samples: Vec<InertialSample>,
    capacity: usize,
}

impl SampleRingBuffer {
    /// Create a buffer with the given capacity
    ///
    /// Capacity is validated by configuration loading; a zero capacity
    /// would make every push an overflow.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample
    ///
    /// Returns `true` iff the buffer reached capacity with this push.
    /// Pushing into a buffer already at capacity is a caller error: the
    /// drain step must flush before the next push.
    pub fn push(&mut self, sample: InertialSample) -> bool {
        debug_assert!(
            self.samples.len() < self.capacity,
            "push into full sample buffer"
        );
        self.samples.push(sample);
        self.samples.len() >= self.capacity
    }

    /// Take all buffered samples in push order, resetting length to 0
    ///
    /// The backing allocation is retained for the next fill cycle.
    pub fn drain_all(&mut self) -> Vec<InertialSample> {
        self.samples.drain(..).collect()
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if no samples are buffered
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
