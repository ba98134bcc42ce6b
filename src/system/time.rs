//! Time keeping module for PineTime

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use embassy_time::Instant;

use pinetime_daynight::clock::Clock;

pub struct TimeReference {
    /// Clock time (UTC)
    time: NaiveDateTime,
    /// Related system time
    instant: Instant,
}

impl TimeReference {
    /// Create new time reference from seconds since the Unix epoch, taken now
    pub fn from_epoch(secs: i64) -> Self {
        Self {
            time: DateTime::from_timestamp(secs, 0)
                .map(|utc| utc.naive_utc())
                .unwrap_or(NaiveDateTime::UNIX_EPOCH),
            instant: Instant::now(),
        }
    }
}

pub struct TimeManager {
    reference: TimeReference,
    /// Offset of local time from UTC in seconds
    offset_secs: i32,
    /// Show the time as 24 hour clock
    h24: bool,
}

impl TimeManager {
    /// Initialize time measurement on boot
    pub fn init(reference: TimeReference, offset_secs: i32, h24: bool) -> Self {
        Self {
            reference,
            offset_secs,
            h24,
        }
    }

    /// Get current time (UTC)
    pub fn get_time(&self) -> NaiveDateTime {
        let elapsed = Instant::now().duration_since(self.reference.instant);
        TimeDelta::try_milliseconds(elapsed.as_millis() as i64)
            .and_then(|delta| self.reference.time.checked_add_signed(delta))
            .unwrap_or(self.reference.time)
    }

    /// Update time reference
    #[allow(unused)]
    pub fn set_time(&mut self, reference: TimeReference) {
        self.reference = reference;
    }
}

impl Clock for TimeManager {
    fn local_time(&self) -> NaiveDateTime {
        let utc = self.get_time();
        TimeDelta::try_seconds(self.offset_secs as i64)
            .and_then(|offset| utc.checked_add_signed(offset))
            .unwrap_or(utc)
    }

    fn is_24h_style(&self) -> bool {
        self.h24
    }
}
