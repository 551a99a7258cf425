//! Time source.
//!
//! Handlers take the current time from a [`Clock`] so tests can pin it.
//! Row timestamps are rendered in the server's local time zone.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Local, Utc};

/// Format of the `fecha_hora` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A source of the current time.
pub trait Clock: Send + Sync + 'static {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Start the clock at `start`.
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Move the clock forward (or back, for a negative duration).
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// Render `instant` as a local-time `fecha_hora` value.
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, TimeZone};

    use super::*;

    #[test]
    fn manual_clock_advances() {
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(Duration::seconds(90));
        assert_eq!(clock.now(), start + Duration::seconds(90));
    }

    #[test]
    fn timestamp_round_trips_through_format() {
        let instant = Utc.with_ymd_and_hms(2025, 9, 25, 6, 30, 15).unwrap();
        let rendered = format_timestamp(instant);

        let parsed = NaiveDateTime::parse_from_str(&rendered, TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parsed, instant.with_timezone(&Local).naive_local());
        assert_eq!(rendered.len(), "2025-09-25 06:30:15".len());
    }
}
