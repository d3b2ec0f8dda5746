//! # Status Indicator
//!
//! Blink-pattern side channel. Purely observational: the pipeline sets
//! a pattern and ticks the indicator; nothing is ever read back.

use tracing::debug;

/// The small set of patterns the logger signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkPattern {
    /// Steady slow blink: waiting for a GPS fix
    SlowBlink,
    /// Steady fast blink: fault (storage or sensor)
    Fault,
    /// N-repeat burst: record-written acknowledgement
    Burst(u8),
}

/// Trait for the indicator collaborator
pub trait StatusIndicator: Send {
    /// Select the active pattern
    fn set_pattern(&mut self, pattern: BlinkPattern);

    /// Advance the animation one step
    ///
    /// Called on every poll iteration, not just on state change, so the
    /// indicator animates while the logger waits.
    fn update(&mut self);
}

/// Indicator that surfaces patterns through the log stream
///
/// Stands in for the LED on hosts without one; the pattern transitions
/// carry the same information.
#[derive(Debug, Default)]
pub struct TracingIndicator {
    pattern: Option<BlinkPattern>,
    ticks: u64,
}

impl TracingIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusIndicator for TracingIndicator {
    fn set_pattern(&mut self, pattern: BlinkPattern) {
        if self.pattern != Some(pattern) {
            debug!("Status pattern: {:?}", pattern);
            self.pattern = Some(pattern);
        }
    }

    fn update(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_indicator_accepts_patterns() {
        let mut indicator = TracingIndicator::new();
        indicator.set_pattern(BlinkPattern::SlowBlink);
        indicator.set_pattern(BlinkPattern::SlowBlink);
        indicator.set_pattern(BlinkPattern::Burst(2));
        indicator.update();
        indicator.update();
        assert_eq!(indicator.ticks, 2);
    }

    #[test]
    fn test_burst_patterns_compare_by_repeat_count() {
        assert_eq!(BlinkPattern::Burst(2), BlinkPattern::Burst(2));
        assert_ne!(BlinkPattern::Burst(2), BlinkPattern::Burst(3));
    }
}
