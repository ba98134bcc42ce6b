//! Tick timer service
//!
//! Watches the wall clock and reports when a subscribed calendar unit rolls
//! over, together with every unit that changed since the last observation.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Set of calendar units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeUnits(u8);

impl TimeUnits {
    pub const NONE: Self = Self(0);
    pub const SECOND: Self = Self(1 << 0);
    pub const MINUTE: Self = Self(1 << 1);
    pub const HOUR: Self = Self(1 << 2);
    pub const DAY: Self = Self(1 << 3);
    pub const MONTH: Self = Self(1 << 4);
    pub const YEAR: Self = Self(1 << 5);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The finest unit in the set together with every coarser unit.
    fn and_coarser(self) -> Self {
        if self.is_empty() {
            return Self::NONE;
        }
        let lowest = self.0 & self.0.wrapping_neg();
        Self(!(lowest - 1) & 0x3f)
    }

    /// Units that differ between two points in time.
    pub fn changed_between(prev: &NaiveDateTime, now: &NaiveDateTime) -> Self {
        let mut units = Self::NONE;
        if prev.second() != now.second() {
            units = units.union(Self::SECOND);
        }
        if prev.minute() != now.minute() {
            units = units.union(Self::MINUTE);
        }
        if prev.hour() != now.hour() {
            units = units.union(Self::HOUR);
        }
        if prev.day() != now.day() {
            units = units.union(Self::DAY);
        }
        if prev.month() != now.month() {
            units = units.union(Self::MONTH);
        }
        if prev.year() != now.year() {
            units = units.union(Self::YEAR);
        }
        units
    }
}

impl core::ops::BitOr for TimeUnits {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Periodic wall-clock notifications at a chosen granularity.
#[derive(Debug, Default)]
pub struct TickTimerService {
    /// Subscribed granularity, `None` when unsubscribed
    unit: Option<TimeUnits>,
    /// Last observed time
    last: Option<NaiveDateTime>,
}

impl TickTimerService {
    pub const fn new() -> Self {
        Self {
            unit: None,
            last: None,
        }
    }

    /// Subscribe to ticks of `unit`. Replaces any earlier subscription.
    pub fn subscribe(&mut self, unit: TimeUnits) {
        debug!("Tick subscription: {=u8:#x}", unit.bits());
        self.unit = Some(unit);
        self.last = None;
    }

    pub fn unsubscribe(&mut self) {
        self.unit = None;
        self.last = None;
    }

    pub fn subscription(&self) -> Option<TimeUnits> {
        self.unit
    }

    /// Observe the wall clock.
    ///
    /// Returns the changed units when the subscribed unit or a coarser one
    /// rolled over since the previous observation. The first observation
    /// after subscribing only records the time.
    pub fn poll(&mut self, now: NaiveDateTime) -> Option<TimeUnits> {
        let unit = self.unit?;
        let prev = self.last.replace(now)?;
        let changed = TimeUnits::changed_between(&prev, &now);
        if changed.intersects(unit.and_coarser()) {
            Some(changed)
        } else {
            None
        }
    }

    /// Start of the next subscribed unit after `now`.
    pub fn next_boundary(&self, now: &NaiveDateTime) -> Option<NaiveDateTime> {
        let unit = self.unit?;
        let date = now.date();
        if unit.contains(TimeUnits::SECOND) {
            let start = date.and_hms_opt(now.hour(), now.minute(), now.second())?;
            start.checked_add_signed(TimeDelta::try_seconds(1)?)
        } else if unit.contains(TimeUnits::MINUTE) {
            let start = date.and_hms_opt(now.hour(), now.minute(), 0)?;
            start.checked_add_signed(TimeDelta::try_minutes(1)?)
        } else if unit.contains(TimeUnits::HOUR) {
            let start = date.and_hms_opt(now.hour(), 0, 0)?;
            start.checked_add_signed(TimeDelta::try_hours(1)?)
        } else if unit.contains(TimeUnits::DAY) {
            date.succ_opt()?.and_hms_opt(0, 0, 0)
        } else if unit.contains(TimeUnits::MONTH) {
            let (year, month) = if date.month() == 12 {
                (date.year() + 1, 1)
            } else {
                (date.year(), date.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)
        } else if unit.contains(TimeUnits::YEAR) {
            NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)?.and_hms_opt(0, 0, 0)
        } else {
            None
        }
    }
}
