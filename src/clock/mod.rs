//! Wall clock access, time formatting and time based services

use chrono::{NaiveDateTime, Timelike};

pub mod bucket;
pub mod tick;
pub mod timer;

pub use bucket::{BucketRule, TimeBucket};
pub use tick::{TickTimerService, TimeUnits};
pub use timer::{TimerId, TimerQueue};

/// Length of the text buffers used for the clock face.
pub const TEXT_BUF_LEN: usize = 8;

/// Source of the local wall-clock time.
pub trait Clock {
    /// Current local time
    fn local_time(&self) -> NaiveDateTime;

    /// Whether the user prefers a 24 hour clock
    fn is_24h_style(&self) -> bool;

    /// Clock style derived from the user preference
    fn clock_style(&self) -> ClockStyle {
        if self.is_24h_style() {
            ClockStyle::TwentyFourHour
        } else {
            ClockStyle::TwelveHour
        }
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn local_time(&self) -> NaiveDateTime {
        (**self).local_time()
    }

    fn is_24h_style(&self) -> bool {
        (**self).is_24h_style()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockStyle {
    TwentyFourHour,
    TwelveHour,
}

/// Write the time as `HH:MM` (24 hour) or `H:MM` (12 hour) into `buf`.
///
/// The 12 hour variant has no leading zero and shows midnight and noon as 12.
pub fn format_time<'a>(
    buf: &'a mut [u8; TEXT_BUF_LEN],
    time: &NaiveDateTime,
    style: ClockStyle,
) -> Result<&'a str, core::fmt::Error> {
    match style {
        ClockStyle::TwentyFourHour => format_no_std::show(
            buf,
            format_args!("{:02}:{:02}", time.hour(), time.minute()),
        ),
        ClockStyle::TwelveHour => {
            let (_, hour) = time.hour12();
            format_no_std::show(buf, format_args!("{}:{:02}", hour, time.minute()))
        }
    }
}

/// Write the two digit hour followed by an `H` (e.g. `07H`) into `buf`.
pub fn format_hour_tag<'a>(
    buf: &'a mut [u8; TEXT_BUF_LEN],
    time: &NaiveDateTime,
) -> Result<&'a str, core::fmt::Error> {
    format_no_std::show(buf, format_args!("{:02}H", time.hour()))
}
