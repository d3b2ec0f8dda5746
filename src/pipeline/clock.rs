//! # Clock Correlator
//!
//! Establishes the session's wall-clock anchor from the first satisfied
//! GPS fix and stamps everything measured afterwards.
//!
//! The source firmware installs the GPS time as the system clock and
//! reads `now()` from then on. Mutating the host clock is neither
//! portable nor ours to do, so the anchor is captured once against a
//! monotonic instant instead; the timestamps that come out are the same.

use crate::error::{LoggerError, Result};
use crate::hw::{BlinkPattern, GpsDateTime, GpsReceiver, StatusIndicator};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::time::Instant;
use tokio::time::Duration;
use tracing::info;

/// Wall-clock anchor set exactly once per boot
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: DateTime<Utc>,
    anchor: Instant,
}

impl SessionClock {
    /// Build the clock from the time parts read off a fix
    ///
    /// # Errors
    ///
    /// Returns a `Gps` error if the receiver reported an impossible
    /// calendar date or time of day.
    pub fn from_fix(t: &GpsDateTime) -> Result<Self> {
        let date = NaiveDate::from_ymd_opt(t.year, t.month, t.day).ok_or_else(|| {
            LoggerError::Gps(format!("invalid date from fix: {}-{}-{}", t.year, t.month, t.day))
        })?;
        let time = NaiveTime::from_hms_opt(t.hour, t.minute, t.second).ok_or_else(|| {
            LoggerError::Gps(format!(
                "invalid time from fix: {}:{}:{}",
                t.hour, t.minute, t.second
            ))
        })?;

        Ok(Self {
            epoch: NaiveDateTime::new(date, time).and_utc(),
            anchor: Instant::now(),
        })
    }

    /// Session epoch as a Unix timestamp
    pub fn epoch(&self) -> i64 {
        self.epoch.timestamp()
    }

    /// Current correlated time: epoch plus elapsed monotonic seconds
    pub fn now(&self) -> i64 {
        self.epoch.timestamp() + self.anchor.elapsed().as_secs() as i64
    }
}

/// Block until the receiver reports a satisfied fix, then anchor the clock
///
/// Polls the fix predicates at `poll_interval` granularity and ticks the
/// indicator on every iteration so it animates while waiting. With
/// `timeout` of `None` this waits forever, which is the shipped
/// behavior; a bounded wait returns `FixTimeout`.
pub async fn await_fix<G, I>(
    gps: &mut G,
    indicator: &mut I,
    poll_interval: Duration,
    timeout: Option<Duration>,
) -> Result<SessionClock>
where
    G: GpsReceiver,
    I: StatusIndicator,
{
    indicator.set_pattern(BlinkPattern::SlowBlink);
    let started = tokio::time::Instant::now();

    loop {
        gps.poll().await?;
        indicator.update();

        if gps.is_fixed() {
            let parts = gps
                .read_time()
                .ok_or_else(|| LoggerError::Gps("fix reported without time".to_string()))?;
            let clock = SessionClock::from_fix(&parts)?;
            info!("GPS fixed. Session epoch: {}", clock.epoch());
            return Ok(clock);
        }

        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                return Err(LoggerError::FixTimeout(limit.as_secs()));
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}
